pub const SEPARATOR: char = '_';

/// The shared room of a two-party conversation.
///
/// Both identities are sorted as strings before joining, so either participant
/// derives the same name.
pub fn derive_room(a: &str, b: &str) -> String {
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
    format!("{lo}{SEPARATOR}{hi}")
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    proptest! {
        #[test]
        fn symmetric(a in any::<String>(), b in any::<String>()) {
            prop_assert_eq!(derive_room(&a, &b), derive_room(&b, &a));
        }

        #[test]
        fn joins_both_ids(a in "[0-9A-Za-z-]{1,36}", b in "[0-9A-Za-z-]{1,36}") {
            let room = derive_room(&a, &b);
            let ab = format!("{a}{SEPARATOR}{b}");
            let ba = format!("{b}{SEPARATOR}{a}");
            prop_assert!(room == ab || room == ba);
        }
    }

    #[test]
    fn sorts_lexicographically() {
        // byte order, so uppercase sorts before lowercase
        assert_eq!(derive_room("admin", "F1"), "F1_admin");
        assert_eq!(derive_room("alice", "bob"), "alice_bob");
        assert_eq!(derive_room("bob", "alice"), "alice_bob");
        assert_eq!(derive_room("10", "9"), "10_9");
    }
}
