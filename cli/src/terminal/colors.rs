use colored::Color;

pub const PRIMARY: Color = Color::TrueColor { r: 110, g: 200, b: 255 };
pub const ACCENT: Color = Color::TrueColor { r: 255, g: 200, b: 90 };
pub const SEPARATOR: Color = Color::BrightBlack;
pub const TEXT_DEFAULT: Color = Color::White;

pub const SUCCESS: Color = Color::Green;
pub const UNREACHABLE: Color = Color::Red;
pub const TIMEOUT: Color = Color::Yellow;
pub const ERROR: Color = Color::Magenta;
pub const CANCELLED: Color = Color::BrightBlack;
