//! The fixed instruction sent with every vision-path page image.
//!
//! Centralised here so tuning the wording never touches fan-out or
//! error-handling logic, and so tests can assert against the exact text.

/// Per-page extraction instruction for the vision model.
///
/// Every page of a document goes through the model with this same prompt;
/// the page image itself carries all the variable content.
pub const VISION_EXTRACTION_PROMPT: &str =
    "Extract all details related to the claim from the given image. \
     Present them in a structured manner.";
