// src/noyau/jetons.rs

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Zero};

use super::eval::{ErreurAnalyse, ErreurCalcul, ErreurEvaluation};

#[derive(Clone, Debug, PartialEq)]
pub enum Tok {
    Num(BigRational),
    Pi,

    // Fonctions + variables (tout ce qui n’est pas pi / opérateur / nombre)
    // NOTE: rpn.rs décidera si c’est une fonction, une variable ou un inconnu.
    Ident(String),

    Plus,
    Minus,
    Star,
    Slash,
    Pow, // ** ou ^

    // Moins unaire : produit par rpn.rs, jamais par tokenize()
    Neg,

    LPar,
    RPar,
}

impl Tok {
    /// Forme texte du jeton (messages d’erreur + traces).
    pub fn texte(&self) -> String {
        match self {
            Tok::Num(r) => format_rat(r),
            Tok::Pi => "pi".to_string(),
            Tok::Ident(name) => name.clone(),

            Tok::Plus => "+".to_string(),
            Tok::Minus => "-".to_string(),
            Tok::Star => "*".to_string(),
            Tok::Slash => "/".to_string(),
            Tok::Pow => "**".to_string(),
            Tok::Neg => "neg".to_string(),

            Tok::LPar => "(".to_string(),
            Tok::RPar => ")".to_string(),
        }
    }
}

/// Tokenize une expression normalisée.
/// Supporte:
/// - entiers (12), décimaux (1.5, .5, 5.), exposants (1e5, 2e-3) -> rationnels EXACTS
/// - opérateurs + - * / et puissance ** ou ^
/// - parenthèses ( )
/// - identifiants [a-z_][a-z0-9_]* (pi devient Tok::Pi)
/// - espaces ignorés
pub fn tokenize(s: &str) -> Result<Vec<Tok>, ErreurEvaluation> {
    let mut out = Vec::new();
    let chars: Vec<char> = s.chars().collect();
    let mut i: usize = 0;

    while i < chars.len() {
        let c = chars[i];

        if c.is_whitespace() {
            i += 1;
            continue;
        }

        match c {
            '(' => {
                out.push(Tok::LPar);
                i += 1;
                continue;
            }
            ')' => {
                out.push(Tok::RPar);
                i += 1;
                continue;
            }
            '+' => {
                out.push(Tok::Plus);
                i += 1;
                continue;
            }
            '-' => {
                out.push(Tok::Minus);
                i += 1;
                continue;
            }
            '*' => {
                // "**" = puissance
                if i + 1 < chars.len() && chars[i + 1] == '*' {
                    out.push(Tok::Pow);
                    i += 2;
                } else {
                    out.push(Tok::Star);
                    i += 1;
                }
                continue;
            }
            '/' => {
                out.push(Tok::Slash);
                i += 1;
                continue;
            }
            '^' => {
                out.push(Tok::Pow);
                i += 1;
                continue;
            }
            _ => {}
        }

        // Identifiants ASCII : [a-zA-Z_][a-zA-Z0-9_]*
        if c.is_ascii_alphabetic() || c == '_' {
            let start = i;
            i += 1;
            while i < chars.len() && (chars[i].is_ascii_alphanumeric() || chars[i] == '_') {
                i += 1;
            }
            let word: String = chars[start..i].iter().collect();
            let w = word.to_lowercase();

            if w == "pi" {
                out.push(Tok::Pi);
            } else {
                out.push(Tok::Ident(w));
            }
            continue;
        }

        // Nombre : chiffres [. chiffres] [e [+-] chiffres]
        if c.is_ascii_digit() || c == '.' {
            let (r, fin) = lire_nombre(&chars, i)?;
            out.push(Tok::Num(r));
            i = fin;
            continue;
        }

        return Err(ErreurAnalyse::CaractereInattendu(c).into());
    }

    Ok(out)
}

/// Lit un littéral numérique à partir de `debut`, retourne (valeur exacte, index de fin).
///
/// Un exposant au-delà de `EXPOSANT_LITTERAL_MAX` est un dépassement, pas une faute de syntaxe.
fn lire_nombre(chars: &[char], debut: usize) -> Result<(BigRational, usize), ErreurEvaluation> {
    let mut i = debut;

    let start_ent = i;
    while i < chars.len() && chars[i].is_ascii_digit() {
        i += 1;
    }
    let entier: String = chars[start_ent..i].iter().collect();

    let mut frac = String::new();
    if i < chars.len() && chars[i] == '.' {
        i += 1;
        let start_frac = i;
        while i < chars.len() && chars[i].is_ascii_digit() {
            i += 1;
        }
        frac = chars[start_frac..i].iter().collect();
    }

    let brut: String = chars[debut..i].iter().collect();
    if entier.is_empty() && frac.is_empty() {
        // "." tout seul
        return Err(ErreurAnalyse::NombreInvalide(brut).into());
    }

    // exposant : seulement si 'e' est suivi d’un chiffre (ou d’un signe puis chiffre)
    let mut exposant: i64 = 0;
    if i < chars.len() && (chars[i] == 'e' || chars[i] == 'E') {
        let mut j = i + 1;
        let mut negatif = false;
        if j < chars.len() && (chars[j] == '+' || chars[j] == '-') {
            negatif = chars[j] == '-';
            j += 1;
        }
        if j < chars.len() && chars[j].is_ascii_digit() {
            let start_exp = j;
            while j < chars.len() && chars[j].is_ascii_digit() {
                j += 1;
            }
            let exp_txt: String = chars[start_exp..j].iter().collect();
            let e = exp_txt
                .parse::<i64>()
                .ok()
                .filter(|e| *e <= EXPOSANT_LITTERAL_MAX)
                .ok_or(ErreurCalcul::Depassement)?;
            exposant = if negatif { -e } else { e };
            i = j;
        }
    }

    // mantisse entière = entier ++ frac, échelle 10^-len(frac)
    let chiffres = format!("{entier}{frac}");
    let mantisse = if chiffres.is_empty() {
        BigInt::zero()
    } else {
        BigInt::parse_bytes(chiffres.as_bytes(), 10)
            .ok_or_else(|| ErreurAnalyse::NombreInvalide(brut))?
    };

    let echelle = exposant - frac.len() as i64;
    let r = if echelle >= 0 {
        BigRational::from_integer(mantisse * pow10(echelle as u32))
    } else {
        BigRational::new(mantisse, pow10((-echelle) as u32))
    };

    Ok((r, i))
}

/// Borne sur les littéraux du type 1e400 (évite des entiers géants).
const EXPOSANT_LITTERAL_MAX: i64 = 4096;

fn pow10(n: u32) -> BigInt {
    BigInt::from(10).pow(n)
}

fn format_rat(r: &BigRational) -> String {
    let n = r.numer();
    let d = r.denom();
    if d.is_one() {
        format!("{n}")
    } else {
        format!("{n}/{d}")
    }
}

/// Format utilitaire (traces) : liste de jetons en texte.
pub fn format_tokens(tokens: &[Tok]) -> String {
    tokens.iter().map(Tok::texte).collect::<Vec<_>>().join(" ")
}
