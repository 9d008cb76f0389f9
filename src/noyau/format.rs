// src/noyau/format.rs
//
// Mise en forme des résultats
// ---------------------------
// - N chiffres significatifs, arrondi au plus proche
// - notation fixe si l’exposant décimal e vérifie min(-(N/3), -5) < e < N,
//   scientifique sinon : 1.00000000000000e+20, 1.00000000000000e-5
// - zéro exact => "0"
// - forme symbolique : zéros de fin retirés (x + 1.0), exposants entiers gardés (x**2)

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Signed, Zero};

use super::eval::ErreurCalcul;
use super::expr::Expr;
use super::lecture::valeur_f64;

fn pow10(n: i64) -> BigInt {
    BigInt::from(10u32).pow(n.unsigned_abs() as u32)
}

fn nb_chiffres(n: &BigInt) -> i64 {
    n.magnitude().to_str_radix(10).len() as i64
}

/* ------------------------ Nombres ------------------------ */

/// Rationnel exact -> texte à `chiffres` chiffres significatifs.
/// `epure` retire les zéros de fin (forme symbolique).
pub fn format_rationnel(r: &BigRational, chiffres: usize, epure: bool) -> String {
    if r.is_zero() {
        return "0".to_string();
    }

    let dps = chiffres.max(1) as i64;
    let a = r.abs();
    let (n, d) = (a.numer(), a.denom());

    // exposant décimal e : 10^e <= a < 10^(e+1)
    let mut e = nb_chiffres(n) - nb_chiffres(d);
    let atteint = if e >= 0 {
        n >= &(d * pow10(e))
    } else {
        &(n * pow10(e)) >= d
    };
    if !atteint {
        e -= 1;
    }

    // q = round(a * 10^(dps-1-e)), demi vers le haut
    let k = dps - 1 - e;
    let (num, den) = if k >= 0 {
        (n * pow10(k), d.clone())
    } else {
        (n.clone(), d * pow10(k))
    };
    let mut q = &num / &den;
    let reste = &num % &den;
    if reste * 2u32 >= den {
        q += 1u32;
    }
    if q == pow10(dps) {
        // 9.99...5 arrondi vers 10.0...
        q = pow10(dps - 1);
        e += 1;
    }

    disposer(r.is_negative(), &q.to_str_radix(10), e, dps, epure)
}

/// Flottant -> texte à `chiffres` chiffres significatifs.
pub fn format_f64(v: f64, chiffres: usize, epure: bool) -> String {
    if v == 0.0 {
        return "0".to_string();
    }

    let dps = chiffres.max(1);
    let sci = format!("{:.*e}", dps - 1, v.abs());
    let (mantisse, exposant) = sci.split_once('e').unwrap_or((sci.as_str(), "0"));
    let e: i64 = exposant.parse().unwrap_or(0);
    let chiffres_txt: String = mantisse.chars().filter(char::is_ascii_digit).collect();

    disposer(v < 0.0, &chiffres_txt, e, dps as i64, epure)
}

/// Place le point décimal dans `chiffres` (d0 d1 d2 ..., valeur d0.d1d2... × 10^e).
fn disposer(negatif: bool, chiffres: &str, e: i64, dps: i64, epure: bool) -> String {
    let min_fixe = (-(dps / 3)).min(-5);

    let (corps, coupe, exposant) = if min_fixe < e && e < dps {
        if e < 0 {
            (format!("{}{chiffres}", "0".repeat(e.unsigned_abs() as usize)), 1, 0)
        } else {
            (chiffres.to_string(), (e + 1) as usize, 0)
        }
    } else {
        (chiffres.to_string(), 1, e)
    };

    let (avant, apres) = corps.split_at(coupe.min(corps.len()));
    let mut s = format!("{avant}.{apres}");

    if epure {
        let t = s.trim_end_matches('0');
        s = if t.ends_with('.') {
            format!("{t}0")
        } else {
            t.to_string()
        };
    }

    let signe = if negatif { "-" } else { "" };
    match exposant {
        0 => format!("{signe}{s}"),
        x if x > 0 => format!("{signe}{s}e+{x}"),
        x => format!("{signe}{s}e{x}"),
    }
}

/* ------------------------ Forme symbolique ------------------------ */

// Précédences d’affichage
const SOMME: u8 = 1;
const PRODUIT: u8 = 2;
const PUISSANCE: u8 = 4;
const ATOME: u8 = 5;

fn entre(txt: String, parentheses: bool) -> String {
    if parentheses {
        format!("({txt})")
    } else {
        txt
    }
}

/// Expression contenant au moins une variable -> texte.
/// Les sous-arbres sans variable sont lus en décimal.
pub fn format_symbolique(expr: &Expr, chiffres: usize) -> Result<String, ErreurCalcul> {
    Ok(ecrire(expr, chiffres)?.0)
}

fn nombre(expr: &Expr, chiffres: usize) -> Result<(String, u8), ErreurCalcul> {
    let txt = match expr {
        Expr::Rat(r) => format_rationnel(r, chiffres, true),
        _ => format_f64(valeur_f64(expr)?, chiffres, true),
    };
    let prec = if txt.starts_with('-') { PRODUIT } else { ATOME };
    Ok((txt, prec))
}

fn ecrire(expr: &Expr, chiffres: usize) -> Result<(String, u8), ErreurCalcul> {
    use Expr::*;

    if matches!(expr, Indefini) {
        return Err(ErreurCalcul::Indefini);
    }
    if !expr.contient_var() {
        return nombre(expr, chiffres);
    }

    Ok(match expr {
        Var(nom) => (nom.clone(), ATOME),

        Neg(x) => {
            let (t, p) = ecrire(x, chiffres)?;
            let par = p < PRODUIT || t.starts_with('-');
            (format!("-{}", entre(t, par)), PRODUIT)
        }

        Add(a, b) => {
            let (ta, _) = ecrire(a, chiffres)?;
            let (tb, pb) = ecrire(b, chiffres)?;
            let txt = match tb.strip_prefix('-') {
                Some(reste) if pb == PRODUIT => format!("{ta} - {reste}"),
                _ => format!("{ta} + {tb}"),
            };
            (txt, SOMME)
        }

        Sub(a, b) => {
            let (ta, _) = ecrire(a, chiffres)?;
            let (tb, pb) = ecrire(b, chiffres)?;
            let par = pb <= SOMME || tb.starts_with('-');
            (format!("{ta} - {}", entre(tb, par)), SOMME)
        }

        // coefficient en tête : x*2 => 2.0*x
        Mul(a, b) if !b.contient_var() => ecrire(&Mul(b.clone(), a.clone()), chiffres)?,

        Mul(a, b) => {
            let (ta, pa) = ecrire(a, chiffres)?;
            let (tb, pb) = ecrire(b, chiffres)?;
            let par_b = pb < PRODUIT || tb.starts_with('-');
            (
                format!("{}*{}", entre(ta, pa < PRODUIT), entre(tb, par_b)),
                PRODUIT,
            )
        }

        Div(a, b) => {
            if !b.contient_var() && valeur_f64(b)? == 0.0 {
                return Err(ErreurCalcul::DivisionParZero);
            }
            // x/2 => 0.5*x
            if let Rat(r) = b.as_ref() {
                let inverse = Rat(BigRational::one() / r);
                return ecrire(&Mul(Box::new(inverse), a.clone()), chiffres);
            }
            let (ta, pa) = ecrire(a, chiffres)?;
            let (tb, pb) = ecrire(b, chiffres)?;
            let par_b = pb <= PRODUIT || tb.starts_with('-');
            (
                format!("{}/{}", entre(ta, pa < PRODUIT), entre(tb, par_b)),
                PRODUIT,
            )
        }

        Pow(base, exp) => {
            let (tb, pb) = ecrire(base, chiffres)?;
            let (te, pe) = match exp.as_ref() {
                // exposant entier : x**2, x**(-1)
                Rat(r) if r.denom().is_one() => {
                    let t = r.numer().to_str_radix(10);
                    let p = if r.is_negative() { PRODUIT } else { ATOME };
                    (t, p)
                }
                e => ecrire(e, chiffres)?,
            };
            (
                format!("{}**{}", entre(tb, pb < ATOME), entre(te, pe < ATOME)),
                PUISSANCE,
            )
        }

        Appel(f, x) => {
            let (t, _) = ecrire(x, chiffres)?;
            (format!("{}({t})", f.nom()), ATOME)
        }

        Rat(_) | Pi | Indefini => nombre(expr, chiffres)?,
    })
}
