use super::*;
use pretty_assertions::assert_eq;

#[test]
fn alloc_and_resolve() {
    let mut arena = StringArena::new();
    let a = arena.alloc("Text");
    let b = arena.alloc("width");

    assert_eq!(arena.get(a), "Text");
    assert_eq!(arena.get(b), "width");
    assert_eq!(arena.chunk_count(), 1);
    assert_eq!(arena.allocated_bytes(), 9);
}

#[test]
fn empty_string_needs_no_storage() {
    let mut arena = StringArena::new();
    let empty = arena.alloc("");
    assert_eq!(empty, Name::EMPTY);
    assert_eq!(arena.get(empty), "");
    assert_eq!(arena.chunk_count(), 0);
}

#[test]
fn full_chunk_starts_a_new_one_without_moving_old_strings() {
    let mut arena = StringArena::new();
    let first = arena.alloc(&"a".repeat(CHUNK_SIZE - 2));
    let second = arena.alloc("xyz");

    assert_eq!(arena.chunk_count(), 2);
    assert_eq!(arena.get(first).len(), CHUNK_SIZE - 2);
    assert_eq!(arena.get(second), "xyz");
}

#[test]
fn oversized_string_gets_dedicated_chunk() {
    let mut arena = StringArena::new();
    let big = "b".repeat(CHUNK_SIZE * 3);
    let name = arena.alloc(&big);
    assert_eq!(arena.get(name), big);

    let small = arena.alloc("after");
    assert_eq!(arena.get(small), "after");
    assert_eq!(arena.chunk_count(), 2);
}

#[test]
fn foreign_handle_resolves_empty() {
    let mut one = StringArena::new();
    let name = one.alloc("only here");
    let other = StringArena::new();
    assert_eq!(other.get(name), "");
}
