//! The optimistic reducer: a pure function from (view, action) to the next
//! view. All optimism lives here; settlement lives in
//! [`Session`](crate::session::Session).

use crate::item::{Action, ViewItem};

/// Apply one action to a view, returning the next view. The input is never
/// mutated. An action naming an id that is not present is a no-op.
pub fn apply(view: &[ViewItem], action: &Action) -> Vec<ViewItem> {
    match action {
        Action::Add { item } => {
            let mut next = view.to_vec();
            next.push(ViewItem::pending(item.clone()));
            next
        }
        Action::Toggle { id } => view
            .iter()
            .map(|v| {
                if v.item.id == *id {
                    let mut item = v.item.clone();
                    item.completed = !item.completed;
                    ViewItem::pending(item)
                } else {
                    v.clone()
                }
            })
            .collect(),
        Action::Update { id, text } => view
            .iter()
            .map(|v| {
                if v.item.id == *id {
                    let mut item = v.item.clone();
                    item.text = text.clone();
                    ViewItem::pending(item)
                } else {
                    v.clone()
                }
            })
            .collect(),
        Action::Delete { id } => view
            .iter()
            .filter(|v| v.item.id != *id)
            .cloned()
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::Item;

    fn view_of(items: &[(i64, &str, bool)]) -> Vec<ViewItem> {
        items
            .iter()
            .map(|(id, text, completed)| {
                ViewItem::confirmed(Item {
                    id: *id,
                    text: (*text).to_string(),
                    completed: *completed,
                })
            })
            .collect()
    }

    #[test]
    fn add_appends_one_pending_entry() {
        let view = view_of(&[(1, "one", false)]);
        let next = apply(
            &view,
            &Action::Add {
                item: Item::new(-9, "two"),
            },
        );
        assert_eq!(next.len(), view.len() + 1);
        assert!(next.last().unwrap().pending);
        assert_eq!(next.last().unwrap().item.text, "two");
    }

    #[test]
    fn toggle_flips_and_marks_pending() {
        let view = view_of(&[(1, "one", false), (2, "two", true)]);
        let next = apply(&view, &Action::Toggle { id: 1 });
        assert_eq!(next.len(), view.len());
        assert!(next[0].item.completed);
        assert!(next[0].pending);
        assert_eq!(next[1], view[1]);
    }

    #[test]
    fn toggle_twice_restores_completed() {
        let view = view_of(&[(1, "one", false)]);
        let once = apply(&view, &Action::Toggle { id: 1 });
        let twice = apply(&once, &Action::Toggle { id: 1 });
        assert_eq!(twice[0].item.completed, view[0].item.completed);
    }

    #[test]
    fn update_replaces_text_only() {
        let view = view_of(&[(1, "one", true)]);
        let next = apply(
            &view,
            &Action::Update {
                id: 1,
                text: "first".to_string(),
            },
        );
        assert_eq!(next.len(), 1);
        assert_eq!(next[0].item.text, "first");
        assert!(next[0].item.completed);
        assert!(next[0].pending);
    }

    #[test]
    fn delete_drops_exactly_one() {
        let view = view_of(&[(1, "one", false), (2, "two", false)]);
        let next = apply(&view, &Action::Delete { id: 1 });
        assert_eq!(next.len(), view.len() - 1);
        assert_eq!(next[0].item.id, 2);
    }

    #[test]
    fn unknown_id_is_a_no_op() {
        let view = view_of(&[(1, "one", false)]);
        assert_eq!(apply(&view, &Action::Toggle { id: 42 }), view);
        assert_eq!(
            apply(
                &view,
                &Action::Update {
                    id: 42,
                    text: "ghost".to_string()
                }
            ),
            view
        );
        assert_eq!(apply(&view, &Action::Delete { id: 42 }), view);
    }

    #[test]
    fn input_is_not_mutated() {
        let view = view_of(&[(1, "one", false)]);
        let before = view.clone();
        let _ = apply(&view, &Action::Toggle { id: 1 });
        assert_eq!(view, before);
    }
}
