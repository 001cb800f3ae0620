pub mod charset;
pub mod xml_chars;
pub mod xml_reader;
