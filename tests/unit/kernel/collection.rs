use super::*;

#[derive(Debug, Clone, PartialEq)]
struct Item {
    key: u32,
    label: &'static str,
}

impl Keyed for Item {
    type Key = u32;

    fn key(&self) -> &u32 {
        &self.key
    }
}

fn item(key: u32) -> Item {
    Item { key, label: "" }
}

fn keys(list: &ActiveList<Item>) -> Vec<u32> {
    list.iter().map(|item| item.key).collect()
}

#[test]
fn push_active_appends_and_activates() {
    let mut list = ActiveList::new();
    assert!(list.push_active(item(1)));
    assert!(list.push_active(item(2)));

    assert_eq!(keys(&list), vec![1, 2]);
    assert_eq!(list.active_key(), Some(&2));
}

#[test]
fn push_active_rejects_duplicate_keys() {
    let mut list = ActiveList::new();
    list.push_active(item(1));
    list.push_active(item(2));

    assert!(!list.push_active(Item {
        key: 1,
        label: "dup"
    }));
    assert_eq!(list.len(), 2);
    assert_eq!(list.get(&1).unwrap().label, "");
    assert_eq!(list.active_key(), Some(&2));
}

#[test]
fn removing_active_falls_back_to_last_remaining() {
    let mut list = ActiveList::new();
    for key in 1..=3 {
        list.push_active(item(key));
    }
    list.set_active(&1);

    list.remove(&1);
    assert_eq!(list.active_key(), Some(&3));
    list.remove(&3);
    assert_eq!(list.active_key(), Some(&2));
    list.remove(&2);
    assert_eq!(list.active_key(), None);
    assert!(list.is_empty());
}

#[test]
fn removing_inactive_keeps_active() {
    let mut list = ActiveList::new();
    for key in 1..=3 {
        list.push_active(item(key));
    }
    list.set_active(&2);

    assert!(list.remove(&3).is_some());
    assert_eq!(list.active_key(), Some(&2));
    assert!(list.remove(&42).is_none());
    assert_eq!(keys(&list), vec![1, 2]);
}

#[test]
fn set_active_ignores_unknown_and_current() {
    let mut list = ActiveList::new();
    list.push_active(item(1));
    list.push_active(item(2));

    assert!(!list.set_active(&9));
    assert!(!list.set_active(&2));
    assert!(list.set_active(&1));
    assert_eq!(list.active().map(|i| i.key), Some(1));
}

#[test]
fn replace_keeps_position_and_active() {
    let mut list = ActiveList::new();
    for key in 1..=3 {
        list.push_active(item(key));
    }
    list.set_active(&2);

    assert!(list.replace(&2, item(20)));
    assert_eq!(keys(&list), vec![1, 20, 3]);
    assert_eq!(list.active_key(), Some(&20));
    assert!(!list.contains(&2));
}

#[test]
fn replace_drops_existing_holder_of_new_key() {
    let mut list = ActiveList::new();
    for key in 1..=3 {
        list.push_active(item(key));
    }
    list.set_active(&1);

    assert!(list.replace(&1, item(3)));
    assert_eq!(keys(&list), vec![3, 2]);
    assert_eq!(list.active_key(), Some(&3));
}

#[test]
fn replace_unknown_key_is_noop() {
    let mut list = ActiveList::new();
    list.push_active(item(1));

    assert!(!list.replace(&7, item(8)));
    assert_eq!(keys(&list), vec![1]);
    assert_eq!(list.active_key(), Some(&1));
}

#[test]
fn active_pointer_stays_valid_under_mixed_operations() {
    let mut list = ActiveList::new();
    let script: [(bool, u32); 12] = [
        (true, 1),
        (true, 2),
        (true, 3),
        (false, 2),
        (true, 4),
        (false, 4),
        (false, 1),
        (true, 5),
        (false, 3),
        (false, 5),
        (true, 6),
        (false, 6),
    ];
    for (open, key) in script {
        if open {
            list.push_active(item(key));
        } else {
            list.remove(&key);
        }
        match list.active_key() {
            Some(key) => assert!(list.contains(key)),
            None => assert!(list.is_empty()),
        }
        let mut seen = keys(&list);
        seen.dedup();
        assert_eq!(seen.len(), list.len());
    }
}
