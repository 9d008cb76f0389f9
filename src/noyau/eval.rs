//! Noyau: évaluation (pipeline réel)
//!
//! tokenize -> RPN -> Expr -> simplify -> lecture (exacte, décimale ou symbolique)
//!
//! Le résultat est toujours un message texte : le noyau ne panique pas et ne
//! remonte pas d’erreur à l’appelant (voir `Evaluation`).

use std::fmt;

use thiserror::Error;
use tracing::{debug, info};

use super::jetons::{format_tokens, tokenize};
use super::lecture::lire;
use super::rpn::{from_rpn, to_rpn};

/// Message affiché quand rien d’exploitable n’a été reconnu.
pub const MESSAGE_VIDE: &str = "No valid expression detected.";

/// Chiffres significatifs par défaut (et maximum) de la lecture décimale.
pub const CHIFFRES_DEFAUT: usize = 15;
pub const CHIFFRES_MAX: usize = 15;

/// Erreur de lecture de l’expression (jetons ou syntaxe).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ErreurAnalyse {
    #[error("unexpected character '{0}'")]
    CaractereInattendu(char),
    #[error("invalid number '{0}'")]
    NombreInvalide(String),
    #[error("unknown identifier '{0}'")]
    IdentifiantInconnu(String),
    #[error("function '{0}' needs parentheses")]
    FonctionSansParentheses(String),
    #[error("unexpected operator '{0}'")]
    OperateurInattendu(String),
    #[error("missing operator before '{0}'")]
    OperateurManquant(String),
    #[error("empty parentheses")]
    ParenthesesVides,
    #[error("unclosed parenthesis")]
    ParenthesesNonFermees,
    #[error("unexpected ')'")]
    ParentheseFermanteInattendue,
    #[error("unexpected end of expression")]
    FinInattendue,
    #[error("invalid expression")]
    ExpressionInvalide,
    #[error("expression too deeply nested (more than {0} levels)")]
    ExpressionTropProfonde(usize),
}

/// Erreur numérique (domaine, division, débordement).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ErreurCalcul {
    #[error("division by zero")]
    DivisionParZero,
    #[error("undefined result")]
    Indefini,
    #[error("result is not a real number")]
    NonReel,
    #[error("numeric overflow")]
    Depassement,
    #[error("symbol '{0}' has no numeric value")]
    VariableLibre(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ErreurEvaluation {
    #[error("invalid syntax: {0}")]
    Analyse(#[from] ErreurAnalyse),
    #[error("{0}")]
    Calcul(#[from] ErreurCalcul),
}

/// Options de lecture.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Options {
    /// Chiffres significatifs (1..=CHIFFRES_MAX).
    pub chiffres: usize,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            chiffres: CHIFFRES_DEFAUT,
        }
    }
}

impl Options {
    pub fn avec_chiffres(chiffres: usize) -> Self {
        Self {
            chiffres: chiffres.clamp(1, CHIFFRES_MAX),
        }
    }
}

/// Issue d’une évaluation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Evaluation {
    /// Entrée vide (ou seulement des espaces).
    Vide,
    Succes {
        expression: String,
        valeur: String,
    },
    Echec {
        expression: String,
        erreur: ErreurEvaluation,
    },
}

impl Evaluation {
    pub fn valeur(&self) -> Option<&str> {
        match self {
            Evaluation::Succes { valeur, .. } => Some(valeur),
            _ => None,
        }
    }

    pub fn erreur(&self) -> Option<&ErreurEvaluation> {
        match self {
            Evaluation::Echec { erreur, .. } => Some(erreur),
            _ => None,
        }
    }

    pub fn est_succes(&self) -> bool {
        matches!(self, Evaluation::Succes { .. })
    }
}

impl fmt::Display for Evaluation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Evaluation::Vide => f.write_str(MESSAGE_VIDE),
            Evaluation::Succes { expression, valeur } => {
                write!(f, "Extracted Expression: {expression}\nResult: {valeur}")
            }
            Evaluation::Echec { expression, erreur } => {
                write!(f, "Error evaluating expression: {expression}\nCause: {erreur}")
            }
        }
    }
}

/// Évalue une expression normalisée et retourne le message utilisateur.
///
/// ```
/// use extracteur_math::evaluate;
///
/// assert_eq!(evaluate("2+2"), "Extracted Expression: 2+2\nResult: 4.00000000000000");
/// assert_eq!(evaluate(""), "No valid expression detected.");
/// ```
pub fn evaluate(normalisee: &str) -> String {
    evaluer(normalisee, &Options::default()).to_string()
}

/// Évalue une expression normalisée avec des options explicites.
pub fn evaluer(normalisee: &str, options: &Options) -> Evaluation {
    if normalisee.trim().is_empty() {
        debug!("entrée vide");
        return Evaluation::Vide;
    }

    let expression = normalisee.to_string();
    match calculer(normalisee, options) {
        Ok(valeur) => {
            info!(expression = %expression, valeur = %valeur, "évaluation réussie");
            Evaluation::Succes { expression, valeur }
        }
        Err(erreur) => {
            info!(expression = %expression, erreur = %erreur, "évaluation échouée");
            Evaluation::Echec { expression, erreur }
        }
    }
}

fn calculer(s: &str, options: &Options) -> Result<String, ErreurEvaluation> {
    // 1) Jetons
    let jetons = tokenize(s)?;
    debug!(jetons = %format_tokens(&jetons));

    // 2) RPN
    let rpn = to_rpn(&jetons)?;
    debug!(rpn = %format_tokens(&rpn));

    // 3) AST (Expr) puis simplification exacte
    let expr = from_rpn(&rpn)?.simplify();
    debug!(expr = %expr, "forme simplifiée");

    // 4) Lecture
    Ok(lire(&expr, options.chiffres)?)
}
