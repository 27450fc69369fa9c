use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{registry::Note, Rgb};

/// Semitone distance between two pitches, folded into one octave.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Interval {
    Unison,
    MinorSecond,
    MajorSecond,
    MinorThird,
    MajorThird,
    PerfectFourth,
    Tritone,
    PerfectFifth,
    MinorSixth,
    MajorSixth,
    MinorSeventh,
    MajorSeventh,
}

impl Interval {
    const ALL: [Interval; 12] = [
        Interval::Unison,
        Interval::MinorSecond,
        Interval::MajorSecond,
        Interval::MinorThird,
        Interval::MajorThird,
        Interval::PerfectFourth,
        Interval::Tritone,
        Interval::PerfectFifth,
        Interval::MinorSixth,
        Interval::MajorSixth,
        Interval::MinorSeventh,
        Interval::MajorSeventh,
    ];

    /// Interval from `from` up to `to`, modulo the octave.
    pub fn between(from: u8, to: u8) -> Self {
        let semitones = (i16::from(to) - i16::from(from)).rem_euclid(12);
        Self::from_semitones(semitones as u8)
    }

    pub fn from_semitones(semitones: u8) -> Self {
        Self::ALL[usize::from(semitones % 12)]
    }

    pub fn semitones(self) -> u8 {
        self as u8
    }

    pub fn name(self) -> &'static str {
        match self {
            Interval::Unison => "unison/octave",
            Interval::MinorSecond => "minor second",
            Interval::MajorSecond => "major second",
            Interval::MinorThird => "minor third",
            Interval::MajorThird => "major third",
            Interval::PerfectFourth => "perfect fourth",
            Interval::Tritone => "tritone",
            Interval::PerfectFifth => "perfect fifth",
            Interval::MinorSixth => "minor sixth",
            Interval::MajorSixth => "major sixth",
            Interval::MinorSeventh => "minor seventh",
            Interval::MajorSeventh => "major seventh",
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Twelve-entry color tables indexed by semitone class.
///
/// `bright` is used while both endpoints of a link are sounding, `dark` once
/// either has been released.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Palette {
    pub bright: [Rgb; 12],
    pub dark: [Rgb; 12],
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            bright: [
                Rgb::BLUE,  // octave
                Rgb::RED,   // minor 2nd
                Rgb::PINK,  // major 2nd
                Rgb::GREEN, // minor 3rd
                Rgb::GREEN, // major 3rd
                Rgb::BLUE,  // perfect 4th
                Rgb::RED,   // tritone
                Rgb::BLUE,  // perfect 5th
                Rgb::GREEN, // minor 6th
                Rgb::GREEN, // major 6th
                Rgb::PINK,  // minor 7th
                Rgb::RED,   // major 7th
            ],
            dark: [
                Rgb::DARK_BLUE,
                Rgb::DARK_RED,
                Rgb::DARK_PINK,
                Rgb::DARK_GREEN,
                Rgb::DARK_GREEN,
                Rgb::DARK_BLUE,
                Rgb::DARK_RED,
                Rgb::DARK_BLUE,
                Rgb::DARK_GREEN,
                Rgb::DARK_GREEN,
                Rgb::DARK_PINK,
                Rgb::DARK_RED,
            ],
        }
    }
}

impl Palette {
    /// Color for a pitch class given whether both endpoints are sounding.
    pub fn lookup(&self, pitch: u8, both_active: bool) -> Rgb {
        let table = if both_active { &self.bright } else { &self.dark };
        table[usize::from(pitch % 12)]
    }

    /// Color of the link drawn from `note` towards `other`.
    ///
    /// Indexed by the pitch class of `note` alone; the interval between the
    /// two pitches does not take part.
    pub fn color(&self, note: &Note, other: &Note) -> Rgb {
        self.lookup(note.pitch, note.active && other.active)
    }
}
