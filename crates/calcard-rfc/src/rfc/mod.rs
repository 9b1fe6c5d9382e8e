pub mod behavior;
pub mod build;
pub mod core;
pub mod ical;
pub mod parse;
pub mod vcard;

#[cfg(test)]
mod tests;
