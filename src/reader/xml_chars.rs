//! XML 1.0 character classes (fifth edition productions).

/// `Char ::= #x9 | #xA | #xD | [#x20-#xD7FF] | [#xE000-#xFFFD] | [#x10000-#x10FFFF]`
#[inline]
pub fn is_xml_char(c: char,) -> bool {
    matches!(c as u32,
        0x9 | 0xA | 0xD |
        0x20..=0xD7FF |
        0xE000..=0xFFFD |
        0x10000..=0x10FFFF
    )
}

#[inline]
pub fn is_name_start_char(c: char,) -> bool {
    matches!(c as u32,
        0x3A | 0x5F |
        0x41..=0x5A | 0x61..=0x7A |
        0xC0..=0xD6 | 0xD8..=0xF6 | 0xF8..=0x2FF |
        0x370..=0x37D | 0x37F..=0x1FFF |
        0x200C..=0x200D | 0x2070..=0x218F |
        0x2C00..=0x2FEF | 0x3001..=0xD7FF |
        0xF900..=0xFDCF | 0xFDF0..=0xFFFD |
        0x10000..=0xEFFFF
    )
}

#[inline]
pub fn is_name_char(c: char,) -> bool {
    is_name_start_char(c,)
        || matches!(c as u32,
            0x2D | 0x2E | 0x30..=0x39 | 0xB7 |
            0x300..=0x36F | 0x203F..=0x2040
        )
}

/// `Name ::= NameStartChar (NameChar)*`
pub fn is_xml_name(name: &str,) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first,) if is_name_start_char(first,) => chars.all(is_name_char,),
        _ => false,
    }
}

/// First character of `text` outside the `Char` production, if any.
pub fn find_invalid_char(text: &str,) -> Option<char,> {
    text.chars().find(|c| !is_xml_char(*c,),)
}
