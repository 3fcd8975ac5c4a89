//! Conversion between the Generation 3 character encoding and Unicode.
//!
//! Western and Japanese cartridges share the Latin letters and digits but use
//! the low half of the byte range for entirely different glyphs (accented
//! Latin vs. kana), so the two tables are kept apart and chosen per string.

use lazy_static::lazy_static;
use serde::Serialize;

use crate::pokemon::Language;

pub const TERMINATOR: u8 = 0xff;
const SPACE: u8 = 0x00;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub enum Charset {
    #[default]
    Western,
    Japanese,
}

type CharTable = [Option<char>; 256];

lazy_static! {
    static ref WESTERN_TABLE: CharTable = build_western_table();
    static ref JAPANESE_TABLE: CharTable = build_japanese_table();
}

impl Charset {
    /// Japanese records are written with the kana table, everything else with
    /// the Western one.
    pub fn for_language(language: Option<Language>) -> Self {
        match language {
            Some(Language::Japanese) => Charset::Japanese,
            _ => Charset::Western,
        }
    }

    fn table(&self) -> &'static CharTable {
        match self {
            Charset::Western => &*WESTERN_TABLE,
            Charset::Japanese => &*JAPANESE_TABLE,
        }
    }

    /// Decodes until the first terminator byte. Bytes with no glyph in the
    /// table (control codes, unused slots) are skipped.
    pub fn decode(&self, text_data: &[u8]) -> String {
        let table = self.table();
        text_data
            .iter()
            .take_while(|byte| **byte != TERMINATOR)
            .filter_map(|byte| table[*byte as usize])
            .collect()
    }

    /// Encodes `text` into a field of exactly `width` bytes. Characters beyond
    /// the width are dropped, characters with no code become spaces, and the
    /// remainder of the field is filled with terminators.
    pub fn encode(&self, text: &str, width: usize) -> Vec<u8> {
        let mut out = text
            .chars()
            .take(width)
            .map(|ch| self.encode_char(ch).unwrap_or(SPACE))
            .collect::<Vec<_>>();
        out.resize(width, TERMINATOR);
        out
    }

    pub fn encode_char(&self, ch: char) -> Option<u8> {
        self.table()
            .iter()
            .position(|entry| *entry == Some(ch))
            .map(|idx| idx as u8)
    }
}

fn fill_run(table: &mut CharTable, start: usize, glyphs: &str) {
    for (idx, ch) in glyphs.chars().enumerate() {
        table[start + idx] = Some(ch);
    }
}

fn fill_shared(table: &mut CharTable) {
    table[SPACE as usize] = Some(' ');
    table[0xab] = Some('!');
    table[0xac] = Some('?');
    table[0xb5] = Some('♂');
    table[0xb6] = Some('♀');
    table[0xba] = Some('/');
    fill_run(table, 0xbb, "ABCDEFGHIJKLMNOPQRSTUVWXYZ");
    fill_run(table, 0xd5, "abcdefghijklmnopqrstuvwxyz");
}

fn build_western_table() -> CharTable {
    let mut table = [None; 256];
    fill_shared(&mut table);
    fill_run(&mut table, 0x01, "ÀÁÂÇÈÉÊËÌ");
    fill_run(&mut table, 0x0b, "ÎÏÒÓÔŒÙÚÛÑßàá");
    fill_run(&mut table, 0x19, "çèéêëì");
    fill_run(&mut table, 0x20, "îïòóôœùúûñºª");
    table[0x2d] = Some('&');
    table[0x2e] = Some('+');
    table[0x35] = Some('=');
    table[0x36] = Some(';');
    table[0x51] = Some('¿');
    table[0x52] = Some('¡');
    table[0x5a] = Some('Í');
    fill_run(&mut table, 0x5b, "%()");
    table[0x68] = Some('â');
    table[0x6f] = Some('í');
    fill_run(&mut table, 0xa1, "0123456789");
    fill_run(&mut table, 0xad, ".-・…“”‘'");
    table[0xb7] = Some('$');
    table[0xb8] = Some(',');
    table[0xb9] = Some('×');
    fill_run(&mut table, 0xf0, ":ÄÖÜäöü");
    table
}

fn build_japanese_table() -> CharTable {
    let mut table = [None; 256];
    fill_shared(&mut table);
    fill_run(
        &mut table,
        0x01,
        "あいうえおかきくけこさしすせそたちつてとなにぬねのはひふへほまみむめもやゆよらりるれろわをん\
         ぁぃぅぇぉゃゅょがぎぐげござじずぜぞだぢづでどばびぶべぼぱぴぷぺぽっ",
    );
    fill_run(
        &mut table,
        0x51,
        "アイウエオカキクケコサシスセソタチツテトナニヌネノハヒフヘホマミムメモヤユヨラリルレロワヲン\
         ァィゥェォャュョガギグゲゴザジズゼゾダヂヅデドバビブベボパピプペポッ",
    );
    fill_run(&mut table, 0xa1, "０１２３４５６７８９");
    fill_run(&mut table, 0xad, "。ー・");
    table
}
