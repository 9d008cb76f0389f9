//! Noyau exact
//!
//! Organisation interne :
//! - normalisation.rs : texte reconnu -> expression normalisée
//! - jetons.rs        : tokenisation
//! - rpn.rs           : shunting-yard + construction Expr
//! - expr.rs          : AST exact + simplify + coeff*π
//! - trig.rs          : angles remarquables + indéfini
//! - lecture.rs       : lecture numérique (f64) + domaines
//! - format.rs        : N chiffres significatifs + forme symbolique
//! - eval.rs          : pipeline complet + messages

pub mod eval;
pub mod expr;
pub mod format;
pub mod jetons;
pub mod lecture;
pub mod normalisation;
pub mod rpn;
pub mod trig;

#[cfg(test)]
mod tests_scientifiques;

#[cfg(test)]
mod tests_fuzz_safe;

// API publique minimale
pub use eval::{
    evaluate, evaluer, ErreurAnalyse, ErreurCalcul, ErreurEvaluation, Evaluation, Options,
    CHIFFRES_DEFAUT, CHIFFRES_MAX, MESSAGE_VIDE,
};
pub use normalisation::normalize;
