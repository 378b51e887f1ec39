//! Fixed C-instruction encodings

/// `a` bit followed by `c1..c6`
pub fn comp_bits(comp: &str) -> Option<&'static str> {
    let bits = match comp {
        "0" => "0101010",
        "1" => "0111111",
        "-1" => "0111010",
        "D" => "0001100",
        "A" => "0110000",
        "!D" => "0001101",
        "!A" => "0110001",
        "-D" => "0001111",
        "-A" => "0110011",
        "D+1" | "1+D" => "0011111",
        "A+1" | "1+A" => "0110111",
        "D-1" => "0001110",
        "A-1" => "0110010",
        "D+A" | "A+D" => "0000010",
        "D-A" => "0010011",
        "A-D" => "0000111",
        "D&A" | "A&D" => "0000000",
        "D|A" | "A|D" => "0010101",
        "M" => "1110000",
        "!M" => "1110001",
        "-M" => "1110011",
        "M+1" | "1+M" => "1110111",
        "M-1" => "1110010",
        "D+M" | "M+D" => "1000010",
        "D-M" => "1010011",
        "M-D" => "1000111",
        "D&M" | "M&D" => "1000000",
        "D|M" | "M|D" => "1010101",
        _ => return None,
    };
    Some(bits)
}

/// Destination registers in any order, each at most once
pub fn dest_bits(dest: &str) -> Option<String> {
    let mut mask = 0u8;
    for register in dest.chars() {
        let bit = match register {
            'A' => 0b100,
            'D' => 0b010,
            'M' => 0b001,
            _ => return None,
        };
        if mask & bit != 0 {
            return None;
        }
        mask |= bit;
    }
    Some(format!("{:03b}", mask))
}

pub fn jump_bits(jump: &str) -> Option<&'static str> {
    let bits = match jump {
        "" => "000",
        "JGT" => "001",
        "JEQ" => "010",
        "JGE" => "011",
        "JLT" => "100",
        "JNE" => "101",
        "JLE" => "110",
        "JMP" => "111",
        _ => return None,
    };
    Some(bits)
}

/// Symbols bound before the first pass
pub const PREDEFINED_SYMBOLS: [(&str, u16); 23] = [
    ("SP", 0),
    ("LCL", 1),
    ("ARG", 2),
    ("THIS", 3),
    ("THAT", 4),
    ("R0", 0),
    ("R1", 1),
    ("R2", 2),
    ("R3", 3),
    ("R4", 4),
    ("R5", 5),
    ("R6", 6),
    ("R7", 7),
    ("R8", 8),
    ("R9", 9),
    ("R10", 10),
    ("R11", 11),
    ("R12", 12),
    ("R13", 13),
    ("R14", 14),
    ("R15", 15),
    ("SCREEN", SCREEN_ADDRESS),
    ("KBD", 24576),
];

/// Variables are allocated below the memory-mapped screen
pub const SCREEN_ADDRESS: u16 = 16384;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comp_table() {
        assert_eq!(comp_bits("D+1"), Some("0011111"));
        assert_eq!(comp_bits("M+D"), comp_bits("D+M"));
        assert_eq!(comp_bits("!M"), Some("1110001"));
        assert_eq!(comp_bits("D*A"), None);
        assert_eq!(comp_bits(""), None);
    }

    #[test]
    fn test_dest_accepts_any_register_order() {
        assert_eq!(dest_bits("").as_deref(), Some("000"));
        assert_eq!(dest_bits("M").as_deref(), Some("001"));
        assert_eq!(dest_bits("AMD").as_deref(), Some("111"));
        assert_eq!(dest_bits("DM").as_deref(), Some("011"));
        assert_eq!(dest_bits("MM"), None);
        assert_eq!(dest_bits("X"), None);
    }

    #[test]
    fn test_jump_table() {
        assert_eq!(jump_bits("JMP"), Some("111"));
        assert_eq!(jump_bits(""), Some("000"));
        assert_eq!(jump_bits("jmp"), None);
    }
}
