//! Raspberry Pi 40-pin header numbering
//!
//! Settings refer to pins by their physical header position; the GPIO driver
//! addresses them by BCM line number.

use crate::{Result, SipError};

/// (header pin, BCM GPIO) pairs for every GPIO-capable header position
const HEADER_TO_BCM: [(u8, u8); 28] = [
    (3, 2),
    (5, 3),
    (7, 4),
    (8, 14),
    (10, 15),
    (11, 17),
    (12, 18),
    (13, 27),
    (15, 22),
    (16, 23),
    (18, 24),
    (19, 10),
    (21, 9),
    (22, 25),
    (23, 11),
    (24, 8),
    (26, 7),
    (27, 0),
    (28, 1),
    (29, 5),
    (31, 6),
    (32, 12),
    (33, 13),
    (35, 19),
    (36, 16),
    (37, 26),
    (38, 20),
    (40, 21),
];

/// Map a physical header pin to its BCM GPIO number
pub fn header_to_bcm(header_pin: u8) -> Result<u8> {
    HEADER_TO_BCM
        .iter()
        .find(|(header, _)| *header == header_pin)
        .map(|(_, bcm)| *bcm)
        .ok_or(SipError::InvalidHeaderPin(header_pin))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_door_default_pins() {
        assert_eq!(header_to_bcm(38).unwrap(), 20);
        assert_eq!(header_to_bcm(40).unwrap(), 21);
        assert_eq!(header_to_bcm(19).unwrap(), 10);
    }

    #[test]
    fn test_power_and_ground_pins_rejected() {
        for pin in [1, 2, 4, 6, 9, 14, 17, 20, 25, 30, 34, 39] {
            assert!(header_to_bcm(pin).is_err(), "pin {} should not map", pin);
        }
        assert!(header_to_bcm(41).is_err());
    }

    #[test]
    fn test_mapping_is_one_to_one() {
        let mut bcm: Vec<u8> = HEADER_TO_BCM.iter().map(|(_, b)| *b).collect();
        bcm.sort_unstable();
        bcm.dedup();
        assert_eq!(bcm.len(), HEADER_TO_BCM.len());
    }
}
