#![no_main]
use libfuzzer_sys::{arbitrary::Arbitrary, fuzz_target};
use safejson::Policy;

#[derive(Arbitrary, Debug)]
struct Input {
    tag: String,
    secret: String,
    width: u8,
}

fuzz_target!(|input: Input| {
    // arbitrary tags either parse or fail cleanly
    let _ = input.tag.parse::<Policy>();

    let len = input.secret.chars().count();
    let width = input.width as usize;

    let filled = Policy::Filled(width).apply(&input.secret, '*');
    if len == 0 {
        assert!(filled.is_empty());
    } else {
        assert_eq!(filled.chars().count(), width);
    }

    let revealed = Policy::Reveal(width).apply(&input.secret, '*');
    assert_eq!(revealed.chars().count(), len);
    if len > 2 * width {
        assert!(revealed.starts_with(&input.secret.chars().take(width).collect::<String>()));
    }

    assert_eq!(Policy::Keep.apply(&input.secret, '*'), input.secret);
});
