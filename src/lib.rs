//! Extracteur d’expressions mathématiques
//!
//! Texte reconnu (OCR, voix, saisie) -> expression normalisée -> résultat affichable.
//!
//! ```
//! use extracteur_math::{evaluate, normalize};
//!
//! let expr = normalize("5 times 3");
//! assert_eq!(evaluate(&expr), "Extracted Expression: 5*3\nResult: 15.0000000000000");
//! ```

pub mod capture;
#[cfg(not(target_arch = "wasm32"))]
pub mod externe;
pub mod noyau;

pub use capture::{depuis_image, depuis_texte, EcouteVocale, ErreurCapture};
pub use noyau::{evaluate, evaluer, normalize, Evaluation, Options};
