use super::*;

#[test]
fn every_decoration_symbol_has_a_bitmap() {
    for &ch in DECORATION_SYMBOLS {
        let bits = symbol_bitmap(ch).unwrap_or_else(|| panic!("no bitmap for {ch}"));
        assert!(bits.iter().any(|&row| row != 0), "{ch} is blank");
    }
}

#[test]
fn art_maps_left_column_to_bit_zero() {
    let bits = art([
        "#.......", //
        ".......#", //
        "", "", "", "", "", "",
    ]);
    assert_eq!(bits[0], 0b0000_0001);
    assert_eq!(bits[1], 0b1000_0000);
    assert!(bits[2..].iter().all(|&row| row == 0));
}

#[test]
fn letters_are_not_symbols() {
    assert_eq!(symbol_bitmap('A'), None);
    assert_eq!(symbol_bitmap(' '), None);
}
