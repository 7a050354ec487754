//! Whole-keyboard behaviour driven through the public API.

use std::collections::BTreeSet;

use phantom_core::{Col, Keyboard, KeyPosition, Modifiers, Row, ROLLOVER_SLOTS};

fn pos(row: u8, col: u8) -> KeyPosition {
    KeyPosition::new(Row::new(row).unwrap(), Col::new(col).unwrap())
}

/// Small deterministic generator so runs are reproducible.
struct XorShift(u32);

impl XorShift {
    fn next(&mut self) -> u32 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.0 = x;
        x
    }

    fn below(&mut self, n: usize) -> usize {
        self.next() as usize % n
    }
}

fn populated() -> Vec<KeyPosition> {
    KeyPosition::all().filter(|p| !p.entry().is_absent()).collect()
}

fn non_modifiers() -> Vec<KeyPosition> {
    KeyPosition::all()
        .filter(|p| {
            let e = p.entry();
            !e.is_absent() && !e.is_modifier()
        })
        .collect()
}

#[test]
fn pressed_state_matches_last_event_and_queue_stays_consistent() {
    let keys = populated();
    let mut rng = XorShift(0x1234_5678);
    let mut kb: Keyboard = Keyboard::default();
    let mut expected = BTreeSet::new();

    for _ in 0..5000 {
        let key = keys[rng.below(keys.len())];
        if expected.contains(&key) {
            assert!(kb.release(key));
            expected.remove(&key);
        } else {
            assert!(kb.press(key));
            expected.insert(key);
        }

        for p in KeyPosition::all() {
            assert_eq!(kb.is_pressed(p), expected.contains(&p));
        }

        let queue = kb.rollover().as_slice();
        assert!(queue.len() <= ROLLOVER_SLOTS);
        let unique: BTreeSet<_> = queue.iter().collect();
        assert_eq!(unique.len(), queue.len(), "duplicate in {queue:?}");
        for p in queue {
            assert!(kb.is_pressed(*p));
            assert!(!p.entry().is_modifier());
        }

        let mask: u8 = expected
            .iter()
            .filter(|p| p.entry().is_modifier())
            .fold(0, |m, p| m | p.entry().output_code());
        assert_eq!(kb.modifiers().bits(), mask);
    }
}

#[test]
fn seventh_simultaneous_key_is_never_reported() {
    let keys = non_modifiers();
    let k: Vec<_> = keys[..7].to_vec();
    let mut kb: Keyboard = Keyboard::default();
    for &key in &k {
        kb.press(key);
    }

    assert_eq!(
        kb.rollover().as_slice(),
        &[k[5], k[4], k[3], k[2], k[1], k[0]]
    );
    assert!(kb.is_pressed(k[6]));

    // Releasing the dropped key changes nothing
    let before = kb.render();
    kb.release(k[6]);
    assert_eq!(kb.render(), before);
}

#[test]
fn middle_release_keeps_survivor_order() {
    let keys = non_modifiers();
    let (k1, k2, k3) = (keys[0], keys[1], keys[2]);
    let mut kb: Keyboard = Keyboard::default();
    kb.press(k1);
    kb.press(k2);
    kb.press(k3);
    kb.release(k2);
    assert_eq!(kb.rollover().as_slice(), &[k3, k1]);

    let report = kb.render();
    assert_eq!(report.keys[0], k3.entry().output_code());
    assert_eq!(report.keys[1], k1.entry().output_code());
    assert_eq!(&report.keys[2..], &[0; 4]);
}

#[test]
fn modifier_mask_ignores_other_activity() {
    let lctrl = pos(0, 0);
    let lshift = pos(1, 0);
    let mut kb: Keyboard = Keyboard::default();

    kb.press(lctrl);
    kb.press(pos(2, 1));
    kb.press(lshift);
    kb.press(pos(3, 3));
    kb.release(pos(2, 1));
    kb.release(lctrl);

    assert_eq!(kb.modifiers(), Modifiers::LEFT_SHIFT);
    assert_eq!(kb.render().modifiers, 0x02);
}

#[test]
fn final_state_does_not_depend_on_history() {
    let keys = non_modifiers();
    let target = [keys[3], keys[10], keys[20], pos(0, 0), pos(0, 13)];
    let noise = [keys[30], keys[31], pos(1, 0)];

    let mut a: Keyboard = Keyboard::default();
    for &key in &target {
        a.press(key);
    }

    let mut b: Keyboard = Keyboard::default();
    for &key in noise.iter().chain(target.iter().rev()) {
        b.press(key);
    }
    for &key in &noise {
        b.release(key);
    }

    assert_eq!(a.modifiers(), b.modifiers());
    let set_a: BTreeSet<_> = a.rollover().iter().collect();
    let set_b: BTreeSet<_> = b.rollover().iter().collect();
    assert_eq!(set_a, set_b);

    let mut slots_a = a.render().keys;
    let mut slots_b = b.render().keys;
    slots_a.sort_unstable();
    slots_b.sort_unstable();
    assert_eq!(slots_a, slots_b);
}
