//! Common regex patterns for medication label extraction.
//!
//! Digits are matched with `[0-9]` rather than `\d` so that only ASCII
//! numerals ever reach integer parsing.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Active ingredient, labelled ("Wirkstoff: Ibuprofen 400 mg")
    pub static ref INGREDIENT_LABEL: Regex = Regex::new(
        r"(?i)(?:wirkstoff(?:e)?|active ingredient|inhaltsstoff(?:e)?|substanz)\s*[:\-]?\s*(?P<value>[^\n]+)"
    ).unwrap();

    // Dosage token ("500 mg", "2,5ml", "1.5 g"); ASCII word boundaries, so
    // umlauts next to the number do not hide it
    pub static ref DOSAGE: Regex = Regex::new(
        r"(?i)(?-u:\b)[0-9]+(?:[.,][0-9]+)?\s?(?:mg|g|ml)(?-u:\b)"
    ).unwrap();

    // Company forms; plain substring match, no word boundaries
    pub static ref COMPANY_FORM: Regex = Regex::new(
        r"(?i)(?:gmbh|ag|kg|pharma|labor|inc|ltd|s\.a\.|co\.)"
    ).unwrap();

    // Lines that are never the product name
    pub static ref NAME_EXCLUSION: Regex = Regex::new(
        r"(?i)(?:wirkstoff|exp|mhd|haltbar|lot|charge|hersteller|active ingredient|gmbh|ag|kg)"
    ).unwrap();

    pub static ref ASCII_LETTER: Regex = Regex::new(r"[a-zA-Z]").unwrap();

    // Labelled expiry, matched against the lowercased text
    pub static ref EXPIRY_LABEL: Regex = Regex::new(
        r"(?:mhd|exp(?:iry)?|haltbar bis|verwendbar bis)[^0-9]{0,12}(?P<value>[0-9]{1,2}[./\-][0-9]{1,2}[./\-][0-9]{2,4}|[0-9]{1,2}[./\-][0-9]{2,4})"
    ).unwrap();

    // Bare D/M/Y or M/Y token anywhere
    pub static ref DATE_TOKEN: Regex = Regex::new(
        r"(?P<value>[0-9]{1,2}[./\-][0-9]{1,2}[./\-][0-9]{2,4}|[0-9]{1,2}[./\-][0-9]{2,4})"
    ).unwrap();

    // Anchored forms used by the date normalizer
    pub static ref DATE_ISO: Regex = Regex::new(
        r"^([0-9]{4})-([0-9]{2})-([0-9]{2})$"
    ).unwrap();

    pub static ref DATE_DMY: Regex = Regex::new(
        r"^([0-9]{1,2})[./\-]([0-9]{1,2})[./\-]([0-9]{2,4})$"
    ).unwrap();

    pub static ref DATE_MY: Regex = Regex::new(
        r"^([0-9]{1,2})[./\-]([0-9]{2,4})$"
    ).unwrap();

    pub static ref WHITESPACE_RUN: Regex = Regex::new(r"[\s\x{FEFF}]+").unwrap();
}
