//! Loading world data files end to end: header, strings, the item tree with
//! every kind of child block, and the subroutine block.

mod common;

use common::*;
use grimoire::config::GameVariant;
use grimoire::opcode_tables::OpcodeTable;
use grimoire::world::{load_game_data, WorldData, PLAYER_ITEM};
use test_log::test;

fn sample_subroutines() -> Vec<SubroutineRecord> {
    vec![
        SubroutineRecord {
            id: 0,
            lines: vec![(
                Some((1, -1, -1)),
                line(&[&[63], &string_operand(2), &[0xFF]]),
            )],
        },
        SubroutineRecord::new(50, vec![vec![42, 1, 0, 7, 0xFF]]),
        // place me, hall
        SubroutineRecord::new(101, vec![line(&[&[33, 0, 5], &item_operand(HALL), &[0xFF]])]),
    ]
}

fn load(variant: GameVariant, image: &[u8]) -> Result<WorldData, String> {
    load_game_data(image, variant, OpcodeTable::for_variant(variant), 10_000)
}

#[test]
fn test_items_and_strings() {
    let image = world_image(&STRINGS, &sample_items(), &sample_subroutines());
    let world = load(GameVariant::Simon1, &image).unwrap();

    assert_eq!(world.strings.len(), 4);
    assert_eq!(world.strings.get(2), "You see a lamp");

    let items = &world.items;
    assert_eq!(items.capacity(), 8);
    assert!(items.is_room(HALL));
    assert!(items.is_room(CELLAR));
    assert!(items.is_object(LAMP));
    assert!(!items.is_object(COIN));
    assert_eq!(items.parent_of(LAMP), HALL);
    assert_eq!(items.children_of(HALL), vec![LAMP]);

    let hall = items.get(HALL).unwrap().as_room().unwrap();
    assert_eq!((hall.subroutine_id, hall.exit_states), (50, 1));
    assert_eq!(hall.exits, vec![CELLAR]);

    let lamp = items.get(LAMP).unwrap();
    assert_eq!((lamp.adjective, lamp.noun), (5, 30));
    let object = lamp.as_object().unwrap();
    assert_eq!(object.value(1), 7);
    assert_eq!(object.value(2), 8);
    assert_eq!(object.value(3), 0);
    assert_eq!(object.name, Some(1));

    let grid = items.get(GRID).unwrap().as_super_room().unwrap();
    assert_eq!((grid.room_x, grid.room_y, grid.room_z), (2, 1, 1));
    assert_eq!(grid.exit_states, vec![0, 0]);

    let chest = items.get(CHEST).unwrap();
    assert_eq!(chest.as_container().unwrap().volume, 10);
    assert_eq!(chest.user_flag(2), 3);

    let player = items.get(PLAYER_ITEM).unwrap();
    assert_eq!(player.noun, 10000);
    assert_eq!(player.parent, 0);
}

#[test]
fn test_subroutines_loaded() {
    let image = world_image(&STRINGS, &sample_items(), &sample_subroutines());
    let world = load(GameVariant::Simon1, &image).unwrap();
    assert_eq!(world.subroutines.len(), 3);
    for id in [0, 50, 101] {
        assert!(world.subroutines.contains(id), "subroutine {id}");
    }

    let verbs = world.subroutines.resolve(0).unwrap();
    assert_eq!(verbs.lines.len(), 1);
    let first = &verbs.lines[0];
    assert_eq!((first.verb, first.noun1, first.noun2), (1, -1, -1));
    // the string operand is stored as a plain word
    assert_eq!(first.code, vec![63, 0, 2, 0xFF]);

    let start = world.subroutines.resolve(101).unwrap();
    assert_eq!(start.lines[0].code, vec![33, 0xFF, 0xFB, 0, 2, 0xFF]);
}

#[test]
fn test_bad_version_rejected() {
    let mut image = world_image(&STRINGS, &sample_items(), &sample_subroutines());
    image[7] = 0x81;
    let err = load(GameVariant::Simon1, &image).unwrap_err();
    assert_eq!(err, "Not a runtime database");
}

#[test]
fn test_unknown_child_tag_fatal() {
    let mut items = sample_items();
    items[5].children.push((3, vec![]));
    let image = world_image(&STRINGS, &items, &sample_subroutines());
    assert!(load(GameVariant::Simon1, &image).is_err());
}

#[test]
fn test_opcode_87_rejected_at_load() {
    let subs = vec![SubroutineRecord::new(9, vec![line(&[&[87], &string_operand(1), &[0xFF]])])];
    let image = world_image(&STRINGS, &sample_items(), &subs);
    let err = load(GameVariant::Simon1, &image).unwrap_err();
    assert_eq!(err, "Unsupported opcode 87");
}

#[test]
fn test_heap_exhaustion_fatal() {
    let image = world_image(&STRINGS, &sample_items(), &sample_subroutines());
    let table = OpcodeTable::for_variant(GameVariant::Simon1);
    assert!(load_game_data(&image, GameVariant::Simon1, table, 8).is_err());
}

#[test]
fn test_truncated_file_fatal() {
    let image = world_image(&STRINGS, &sample_items(), &sample_subroutines());
    assert!(load(GameVariant::Simon1, &image[..image.len() / 2]).is_err());
}
