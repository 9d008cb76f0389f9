// src/noyau/expr.rs
//
// AST exact (rationnels, sans flottants).
// - Rat : rationnel exact
// - Pi  : symbole π
// - Indefini : résultat exact indéfini (ex: tan(π/2))
// - Var : symbole libre d’une lettre (ex: x)
// - Appel : fonction unaire (sin, log, sqrt, ...)
//
// IMPORTANT (SAFE):
// - simplify() ne doit jamais “inventer” une valeur pour Var.
// - simplify() ne doit jamais effacer une erreur numérique : 0*(1/0) reste tel quel
//   (lecture.rs signalera la division par zéro).

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Signed, ToPrimitive, Zero};

use std::fmt;

use super::trig::{trig_special, TrigOutcome};

/// Fonctions reconnues après normalisation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Fonction {
    Sin,
    Cos,
    Tan,
    Asin,
    Acos,
    Atan,
    Sinh,
    Cosh,
    Tanh,
    Exp,
    Log, // logarithme naturel ("log" ou "ln")
    Sqrt,
    Abs,
}

impl Fonction {
    pub fn depuis_nom(nom: &str) -> Option<Fonction> {
        use Fonction::*;
        Some(match nom {
            "sin" => Sin,
            "cos" => Cos,
            "tan" => Tan,
            "asin" => Asin,
            "acos" => Acos,
            "atan" => Atan,
            "sinh" => Sinh,
            "cosh" => Cosh,
            "tanh" => Tanh,
            "exp" => Exp,
            "log" | "ln" => Log,
            "sqrt" => Sqrt,
            "abs" => Abs,
            _ => return None,
        })
    }

    pub fn nom(self) -> &'static str {
        use Fonction::*;
        match self {
            Sin => "sin",
            Cos => "cos",
            Tan => "tan",
            Asin => "asin",
            Acos => "acos",
            Atan => "atan",
            Sinh => "sinh",
            Cosh => "cosh",
            Tanh => "tanh",
            Exp => "exp",
            Log => "log",
            Sqrt => "sqrt",
            Abs => "abs",
        }
    }

    /// Domaine restreint (la lecture numérique peut échouer).
    fn domaine_restreint(self) -> bool {
        matches!(
            self,
            Fonction::Tan | Fonction::Asin | Fonction::Acos | Fonction::Log | Fonction::Sqrt
        )
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Expr {
    Rat(BigRational),
    Pi,
    Indefini, // ex: tan(pi/2)

    Var(String),

    Neg(Box<Expr>),
    Add(Box<Expr>, Box<Expr>),
    Sub(Box<Expr>, Box<Expr>),
    Mul(Box<Expr>, Box<Expr>),
    Div(Box<Expr>, Box<Expr>),
    Pow(Box<Expr>, Box<Expr>),

    Appel(Fonction, Box<Expr>),
}

/// Taille max (en bits) d’une puissance rationnelle calculée exactement.
/// Au-delà, la puissance reste symbolique et passe par la lecture flottante.
const BITS_PUISSANCE_MAX: u64 = 200_000;

fn rat_int(n: i64) -> Expr {
    Expr::Rat(BigRational::from_integer(BigInt::from(n)))
}

impl Expr {
    /// Simplification locale (SAFE), sans heuristiques.
    /// Objectif: réduire ce qui est strictement démontrable sans exploser l’arbre.
    pub fn simplify(self) -> Expr {
        use Expr::*;

        match self {
            // Feuilles: aucune simplification à faire
            Rat(_) | Pi | Indefini | Var(_) => self,

            Neg(x) => match x.simplify() {
                Indefini => Indefini,
                Rat(r) => Rat(-r),
                Neg(y) => *y,
                y => Neg(Box::new(y)),
            },

            Add(a, b) => {
                let a = a.simplify();
                let b = b.simplify();
                match (&a, &b) {
                    (Indefini, _) | (_, Indefini) => Indefini,
                    (Rat(x), Rat(y)) => Rat(x + y),
                    (Rat(x), _) if x.is_zero() => b,
                    (_, Rat(y)) if y.is_zero() => a,
                    _ => Add(Box::new(a), Box::new(b)),
                }
            }

            Sub(a, b) => {
                let a = a.simplify();
                let b = b.simplify();

                if matches!(a, Indefini) || matches!(b, Indefini) {
                    return Indefini;
                }

                // x - x => 0 (seulement si rien ne peut échouer dedans)
                if a == b && !a.peut_echouer() {
                    return Rat(BigRational::zero());
                }

                match (&a, &b) {
                    (Rat(x), Rat(y)) => Rat(x - y),
                    (_, Rat(y)) if y.is_zero() => a,
                    (Rat(x), _) if x.is_zero() => Neg(Box::new(b)).simplify(),
                    _ => Sub(Box::new(a), Box::new(b)),
                }
            }

            Mul(a, b) => {
                let a = a.simplify();
                let b = b.simplify();

                if matches!(a, Indefini) || matches!(b, Indefini) {
                    return Indefini;
                }

                // √x * √x => x
                if let (Appel(Fonction::Sqrt, x), Appel(Fonction::Sqrt, y)) = (&a, &b) {
                    if x == y && !x.peut_echouer() {
                        if let Rat(r) = x.as_ref() {
                            if r.is_negative() {
                                return Mul(Box::new(a), Box::new(b));
                            }
                        }
                        return (**x).clone();
                    }
                }

                // √u * √v => √(u*v) si u,v rationnels >= 0
                if let (Appel(Fonction::Sqrt, u), Appel(Fonction::Sqrt, v)) = (&a, &b) {
                    if let (Rat(ru), Rat(rv)) = (u.as_ref(), v.as_ref()) {
                        if !ru.is_negative() && !rv.is_negative() {
                            return Appel(Fonction::Sqrt, Box::new(Rat(ru * rv))).simplify();
                        }
                    }
                }

                match (&a, &b) {
                    (Rat(x), Rat(y)) => Rat(x * y),
                    (Rat(x), _) if x.is_zero() && !b.peut_echouer() => a,
                    (_, Rat(y)) if y.is_zero() && !a.peut_echouer() => b,
                    (Rat(x), _) if x.is_one() => b,
                    (_, Rat(y)) if y.is_one() => a,
                    _ => Mul(Box::new(a), Box::new(b)),
                }
            }

            Div(a, b) => {
                let a = a.simplify();
                let b = b.simplify();

                if matches!(a, Indefini) || matches!(b, Indefini) {
                    return Indefini;
                }

                // division par zéro : on garde symbolique ici (lecture.rs gérera l’erreur)
                if let Rat(y) = &b {
                    if y.is_zero() {
                        return Div(Box::new(a), Box::new(b));
                    }
                }

                // √u / √v => √(u/v) si u,v rationnels > 0
                if let (Appel(Fonction::Sqrt, u), Appel(Fonction::Sqrt, v)) = (&a, &b) {
                    if let (Rat(ru), Rat(rv)) = (u.as_ref(), v.as_ref()) {
                        if ru.is_positive() && rv.is_positive() {
                            return Appel(Fonction::Sqrt, Box::new(Rat(ru / rv))).simplify();
                        }
                    }
                }

                match (&a, &b) {
                    (Rat(x), Rat(y)) => Rat(x / y),
                    (_, Rat(y)) if y.is_one() => a,
                    _ => Div(Box::new(a), Box::new(b)),
                }
            }

            Pow(base, exp) => {
                let base = base.simplify();
                let exp = exp.simplify();

                if matches!(base, Indefini) || matches!(exp, Indefini) {
                    return Indefini;
                }

                if let Rat(e) = &exp {
                    if e.is_zero() && !base.peut_echouer() {
                        return Rat(BigRational::one());
                    }
                    if e.is_one() {
                        return base;
                    }
                    if let Rat(b) = &base {
                        if let Some(r) = rational_pow_exact(b, e) {
                            return Rat(r);
                        }
                    }
                }

                Pow(Box::new(base), Box::new(exp))
            }

            Appel(f, x) => {
                let x = x.simplify();
                if matches!(x, Indefini) {
                    return Indefini;
                }
                simplify_appel(f, x)
            }
        }
    }

    /// Vrai si la lecture numérique de ce sous-arbre peut échouer
    /// (division, puissance, fonction à domaine restreint, indéfini).
    pub fn peut_echouer(&self) -> bool {
        use Expr::*;
        match self {
            Rat(_) | Pi | Var(_) => false,
            Indefini | Div(_, _) | Pow(_, _) => true,
            Neg(x) => x.peut_echouer(),
            Add(a, b) | Sub(a, b) | Mul(a, b) => a.peut_echouer() || b.peut_echouer(),
            Appel(f, x) => f.domaine_restreint() || x.peut_echouer(),
        }
    }

    /// Détecte si une expression contient au moins une variable.
    /// Itératif + garde-fou : si l'arbre est trop gros, on retourne true (SAFE => lecture symbolique).
    pub fn contient_var(&self) -> bool {
        use Expr::*;

        const MAX_NOEUDS: usize = 200_000;

        let mut pile: Vec<&Expr> = Vec::with_capacity(64);
        pile.push(self);

        let mut visites: usize = 0;

        while let Some(e) = pile.pop() {
            visites += 1;
            if visites > MAX_NOEUDS {
                return true;
            }

            match e {
                Var(_) => return true,
                Rat(_) | Pi | Indefini => {}
                Neg(x) | Appel(_, x) => pile.push(x.as_ref()),
                Add(a, b) | Sub(a, b) | Mul(a, b) | Div(a, b) | Pow(a, b) => {
                    pile.push(a.as_ref());
                    pile.push(b.as_ref());
                }
            }
        }

        false
    }

    /// Détecte un coeff·π (Add/Sub/Mul/Div rationnels autour de π).
    ///
    /// SAFE: Var => None (on ne “devine” rien).
    pub fn coeff_pi(&self) -> Option<BigRational> {
        use Expr::*;

        match self {
            Pi => Some(BigRational::one()),
            Rat(r) if r.is_zero() => Some(BigRational::zero()),

            Neg(x) => x.coeff_pi().map(|c| -c),
            Add(a, b) => Some(a.coeff_pi()? + b.coeff_pi()?),
            Sub(a, b) => Some(a.coeff_pi()? - b.coeff_pi()?),

            Mul(a, b) => match (a.as_ref(), b.as_ref()) {
                (Rat(r), x) | (x, Rat(r)) => x.coeff_pi().map(|c| c * r),
                _ => None,
            },

            Div(a, b) => match b.as_ref() {
                Rat(r) if !r.is_zero() => a.coeff_pi().map(|c| c / r),
                _ => None,
            },

            _ => None,
        }
    }
}

/// Valeurs exactes des fonctions (angles spéciaux, points remarquables).
fn simplify_appel(f: Fonction, x: Expr) -> Expr {
    use Expr::*;

    match f {
        Fonction::Sin | Fonction::Cos | Fonction::Tan => match trig_special(&x, f) {
            Some(TrigOutcome::Valeur(v)) => v.simplify(),
            Some(TrigOutcome::Indefini) => Indefini,
            None => Appel(f, Box::new(x)),
        },

        Fonction::Sqrt => match &x {
            Rat(r) => match rational_sqrt_exact(r) {
                Some(s) => Rat(s),
                None => Appel(f, Box::new(x)),
            },
            _ => Appel(f, Box::new(x)),
        },

        Fonction::Abs => match &x {
            Rat(r) => Rat(r.abs()),
            _ => Appel(f, Box::new(x)),
        },

        Fonction::Log if x == rat_int(1) => rat_int(0),
        Fonction::Exp | Fonction::Cosh if x == rat_int(0) => rat_int(1),
        Fonction::Asin | Fonction::Atan | Fonction::Sinh | Fonction::Tanh if x == rat_int(0) => {
            rat_int(0)
        }
        Fonction::Acos if x == rat_int(1) => rat_int(0),

        _ => Appel(f, Box::new(x)),
    }
}

/* ------------------------ Modulo rationnel exact (sans flottants) ------------------------ */

/// Réduction modulo `periode` sur un coefficient rationnel (ex: periode=2 pour sin/cos, 1 pour tan).
/// Retourne un rationnel dans [0, periode).
///
/// Si coeff = n/d, alors coeff mod periode = (n mod (periode*d))/d.
pub(crate) fn mod_rationnel(coeff: &BigRational, periode: i64) -> BigRational {
    if periode <= 0 || coeff.is_zero() {
        return coeff.clone();
    }

    let d = coeff.denom().clone(); // denom > 0 (num_rational)
    let n = coeff.numer().clone();

    let m = BigInt::from(periode) * &d; // periode*d  (m > 0)

    let mut r = &n % &m;
    if r.is_negative() {
        r += &m;
    }
    BigRational::new(r, d)
}

/* ------------------------ Affichage debug (traces) ------------------------ */

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Expr::*;
        match self {
            Rat(r) => {
                let n = r.numer();
                let d = r.denom();
                if d.is_one() {
                    write!(f, "{n}")
                } else {
                    write!(f, "{n}/{d}")
                }
            }
            Pi => write!(f, "pi"),
            Indefini => write!(f, "undefined"),
            Var(s) => write!(f, "{s}"),
            Neg(x) => write!(f, "(-{x})"),
            Add(a, b) => write!(f, "({a}+{b})"),
            Sub(a, b) => write!(f, "({a}-{b})"),
            Mul(a, b) => write!(f, "({a}*{b})"),
            Div(a, b) => write!(f, "({a}/{b})"),
            Pow(a, b) => write!(f, "({a}**{b})"),
            Appel(func, x) => write!(f, "{}({x})", func.nom()),
        }
    }
}

/* ------------------------ Outils rationnels (utilisés par simplify) ------------------------ */

/// base**exp exact si possible :
/// - exp entier (taille bornée)
/// - exp = k/2 et base^k carré parfait
///
/// None => on laisse la puissance symbolique (0**-n, racine non exacte, trop gros).
fn rational_pow_exact(base: &BigRational, exp: &BigRational) -> Option<BigRational> {
    let k = exp.numer().to_i64()?;

    if base.is_zero() && k < 0 {
        return None;
    }

    let taille = base.numer().bits() + base.denom().bits();
    if taille.saturating_mul(k.unsigned_abs()) > BITS_PUISSANCE_MAX {
        return None;
    }

    if exp.denom().is_one() {
        return Some(rational_pow_int(base.clone(), k));
    }

    if exp.denom() == &BigInt::from(2) && !base.is_negative() {
        return rational_sqrt_exact(&rational_pow_int(base.clone(), k));
    }

    None
}

fn rational_pow_int(base: BigRational, exp: i64) -> BigRational {
    if exp == 0 {
        return BigRational::one();
    }
    if exp < 0 {
        let pos = rational_pow_int(base, exp.saturating_neg());
        return BigRational::one() / pos;
    }

    let mut e = exp as u64;
    let mut acc = BigRational::one();
    let mut b = base;

    while e > 0 {
        if (e & 1) == 1 {
            acc *= b.clone();
        }
        e >>= 1;
        if e > 0 {
            b *= b.clone();
        }
    }
    acc
}

fn rational_sqrt_exact(r: &BigRational) -> Option<BigRational> {
    if r.is_negative() {
        return None;
    }
    let sn = int_sqrt_exact(r.numer())?;
    let sd = int_sqrt_exact(r.denom())?;
    Some(BigRational::new(sn, sd))
}

fn int_sqrt_exact(x: &BigInt) -> Option<BigInt> {
    if x.is_negative() {
        return None;
    }
    let s = x.sqrt();
    if &s * &s == *x {
        Some(s)
    } else {
        None
    }
}
