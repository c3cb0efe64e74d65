/// Symbols a random decoration is drawn from. Each has a built-in 8x8 bitmap.
pub const DECORATION_SYMBOLS: &[char] = &[
    '❤', '❀', '✰', '☽', '☁', '⭐', '✿', '❖', '✧', '⚡', '✦', '☘', '✪',
];

/// Row bitmaps in `font8x8` layout: one byte per row, bit 0 is the leftmost pixel.
const fn art(rows: [&str; 8]) -> [u8; 8] {
    let mut out = [0u8; 8];
    let mut y = 0;
    while y < 8 {
        let row = rows[y].as_bytes();
        let mut x = 0;
        while x < 8 && x < row.len() {
            if row[x] == b'#' {
                out[y] |= 1 << x;
            }
            x += 1;
        }
        y += 1;
    }
    out
}

const HEART: [u8; 8] = art([
    ".##.##..", //
    "#######.", //
    "#######.", //
    "#######.", //
    ".#####..", //
    "..###...", //
    "...#....", //
    "........",
]);

const STAR: [u8; 8] = art([
    "...##...", //
    "...##...", //
    "########", //
    ".######.", //
    "..####..", //
    ".##..##.", //
    "##....##", //
    "........",
]);

const SPARKLE: [u8; 8] = art([
    "...##...", //
    "...##...", //
    "..####..", //
    "########", //
    "..####..", //
    "...##...", //
    "...##...", //
    "........",
]);

const HOLLOW_SPARKLE: [u8; 8] = art([
    "...##...", //
    "...##...", //
    "..#..#..", //
    "##....##", //
    "..#..#..", //
    "...##...", //
    "...##...", //
    "........",
]);

const FLOWER: [u8; 8] = art([
    ".##..##.", //
    "########", //
    ".##..##.", //
    "...##...", //
    ".##..##.", //
    "########", //
    ".##..##.", //
    "........",
]);

const MOON: [u8; 8] = art([
    "..####..", //
    ".##.....", //
    "##......", //
    "##......", //
    "##......", //
    ".##.....", //
    "..####..", //
    "........",
]);

const CLOUD: [u8; 8] = art([
    "........", //
    "..###...", //
    ".#####..", //
    ".######.", //
    "########", //
    "########", //
    "........", //
    "........",
]);

const DIAMOND: [u8; 8] = art([
    "...##...", //
    "..####..", //
    ".##..##.", //
    "##....##", //
    ".##..##.", //
    "..####..", //
    "...##...", //
    "........",
]);

const BOLT: [u8; 8] = art([
    "....###.", //
    "...###..", //
    "..###...", //
    ".######.", //
    "...###..", //
    "..###...", //
    ".##.....", //
    "........",
]);

const SHAMROCK: [u8; 8] = art([
    "...##...", //
    "..####..", //
    "##.##.##", //
    "########", //
    ".##..##.", //
    "...##...", //
    "...##...", //
    "..##....",
]);

const CIRCLED_STAR: [u8; 8] = art([
    "..####..", //
    ".#....#.", //
    "#..##..#", //
    "#.####.#", //
    "#..##..#", //
    "#.#..#.#", //
    ".#....#.", //
    "..####..",
]);

/// Built-in bitmap for a decoration symbol.
pub(crate) fn symbol_bitmap(ch: char) -> Option<[u8; 8]> {
    let bits = match ch {
        '❤' | '❣' => HEART,
        '✰' | '⭐' | '★' | '☆' => STAR,
        '✦' => SPARKLE,
        '✧' => HOLLOW_SPARKLE,
        '❀' | '✿' => FLOWER,
        '☽' | '☾' => MOON,
        '☁' => CLOUD,
        '❖' | '◆' => DIAMOND,
        '⚡' => BOLT,
        '☘' => SHAMROCK,
        '✪' => CIRCLED_STAR,
        _ => return None,
    };
    Some(bits)
}

#[cfg(test)]
#[path = "../../tests/unit/text/symbols.rs"]
mod tests;
