//! Relationship integrity across multi-element deltas

use bim_model::{
    Change, Delta, Door, DoorType, Element, ElementBase, ElementKind, Level, LevelId, Model,
    Point2, RelationKind, Wall, WallType,
};

fn setup() -> Model {
    let mut model = Model::new();
    let mut delta = Delta::new();
    delta.push(Change::AddLevel(Level::new(LevelId(0), "Level 1", 0.0, 3.0)));
    model.apply(&delta).unwrap();
    model
}

fn wall_with_door(model: &Model) -> (Element, Element) {
    let mut ids = model.id_allocator();
    let wall_id = ids.next(ElementKind::Wall);
    let door_id = ids.next(ElementKind::Door);

    let mut wall = Wall {
        base: ElementBase::new(wall_id, LevelId(0)),
        start: Point2::new(0.0, 0.0),
        end: Point2::new(6.0, 0.0),
        height: 3.0,
        thickness: 0.2,
        wall_type: WallType::Basic,
    };
    wall.base.relationships.add(RelationKind::Hosts, door_id);

    let mut door = Door {
        base: ElementBase::new(door_id, LevelId(0)),
        offset: 2.0,
        position: Point2::new(2.0, 0.0),
        width: 0.9,
        height: 2.1,
        door_type: DoorType::Single,
    };
    door.base.relationships.add(RelationKind::HostedBy, wall_id);

    (Element::Wall(wall), Element::Door(door))
}

#[test]
fn hosted_pair_applies_and_reverts() {
    let mut model = setup();
    let before = model.clone();
    let (wall, door) = wall_with_door(&model);

    let mut delta = Delta::new();
    delta.add(wall.clone()).add(door.clone());
    model.apply(&delta).unwrap();
    assert_eq!(model.len(), 2);
    assert_eq!(
        model.get(door.id()).unwrap().relationships().host(),
        Some(wall.id())
    );

    model.apply(&delta.inverse()).unwrap();
    assert_eq!(model.elements().count(), before.elements().count());
    assert!(model.check_integrity().is_ok());
}

#[test]
fn removing_host_alone_is_rejected() {
    let mut model = setup();
    let (wall, door) = wall_with_door(&model);
    let mut delta = Delta::new();
    delta.add(wall.clone()).add(door);
    model.apply(&delta).unwrap();
    let snapshot = model.clone();

    let mut remove = Delta::new();
    remove.remove(wall);
    assert!(model.apply(&remove).is_err());
    assert_eq!(model, snapshot);
}

#[test]
fn removing_host_with_openings_succeeds() {
    let mut model = setup();
    let (wall, door) = wall_with_door(&model);
    let mut delta = Delta::new();
    delta.add(wall.clone()).add(door.clone());
    model.apply(&delta).unwrap();

    let mut remove = Delta::new();
    remove.remove(door).remove(wall);
    model.apply(&remove).unwrap();
    assert!(model.is_empty());
}
