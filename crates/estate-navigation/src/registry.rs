use serde::Serialize;

use crate::state::Section;

/// Horizontal slide direction, named after the side the incoming view
/// enters from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Left,
    Right,
}

impl Direction {
    pub fn opposite(self) -> Self {
        match self {
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }
}

/// Slide order of the top-level sections. `my-actions` is not part of it;
/// transitions that touch it are paired and carry their own order.
const SLIDE_ORDER: [Section; 5] = [
    Section::Home,
    Section::Auction,
    Section::Buy,
    Section::Rent,
    Section::Profile,
];

/// Visual order of the hosts used by paired transitions.
const PAIRED_ORDER: [Section; 3] = [Section::Home, Section::MyActions, Section::Profile];

#[derive(Debug, Clone, Copy, Default)]
pub struct SectionRegistry;

impl SectionRegistry {
    pub fn index_of(&self, section: Section) -> Option<usize> {
        SLIDE_ORDER.iter().position(|candidate| *candidate == section)
    }

    pub fn is_home_subsection(&self, section: Section) -> bool {
        section.as_subsection().is_some()
    }

    /// Unregistered sections on either side always slide right.
    pub fn direction(&self, from: Section, to: Section) -> Direction {
        match (self.index_of(from), self.index_of(to)) {
            (Some(from_index), Some(to_index)) if to_index < from_index => Direction::Left,
            _ => Direction::Right,
        }
    }

    pub fn paired_direction(&self, from: Section, to: Section) -> Direction {
        let position =
            |section: Section| PAIRED_ORDER.iter().position(|host| *host == section.host());
        match (position(from), position(to)) {
            (Some(from_index), Some(to_index)) if to_index < from_index => Direction::Left,
            _ => Direction::Right,
        }
    }
}
