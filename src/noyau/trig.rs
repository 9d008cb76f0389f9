// src/noyau/trig.rs
//
// Valeurs exactes de sin/cos/tan sur les angles remarquables
// ---------------------------------------------------------
// - coeff·π extrait par Expr::coeff_pi()
// - réduction modulo période via mod_rationnel() (sin/cos: 2 ; tan: 1)
// - table sur les dénominateurs n ∈ {1,2,3,4,6}

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::ToPrimitive;

use super::expr::{mod_rationnel, Expr, Fonction};

#[derive(Clone, Debug, PartialEq)]
pub enum TrigOutcome {
    Valeur(Expr),
    Indefini,
}

/// Forme exacte d’une valeur de la table (signe, radicande, dénominateur) :
/// signe * √radicande / denominateur, radicande = 1 => rationnel.
type Forme = (i64, i64, i64);

const ZERO: Forme = (0, 1, 1);
const UN: Forme = (1, 1, 1);
const MOINS_UN: Forme = (-1, 1, 1);
const DEMI: Forme = (1, 1, 2);
const MOINS_DEMI: Forme = (-1, 1, 2);
const R2_2: Forme = (1, 2, 2);
const MOINS_R2_2: Forme = (-1, 2, 2);
const R3_2: Forme = (1, 3, 2);
const MOINS_R3_2: Forme = (-1, 3, 2);
const R3_3: Forme = (1, 3, 3);
const MOINS_R3_3: Forme = (-1, 3, 3);
const R3: Forme = (1, 3, 1);
const MOINS_R3: Forme = (-1, 3, 1);

/// Reconnaît sin/cos/tan d’un multiple rationnel de π.
///
/// - Some(Valeur(expr_exacte)) si l’angle est dans la table
/// - Some(Indefini) pour tan(π/2 + kπ)
/// - None sinon (la lecture numérique prendra le relais)
pub fn trig_special(x: &Expr, f: Fonction) -> Option<TrigOutcome> {
    let coeff = x.coeff_pi()?;

    let periode = match f {
        Fonction::Sin | Fonction::Cos => 2,
        Fonction::Tan => 1,
        _ => return None,
    };
    let (k, n) = rational_to_small_kn(&mod_rationnel(&coeff, periode))?;

    // k/n ∈ [0, periode) : k ∈ [0, periode*n)
    let forme = match (f, k, n) {
        (Fonction::Sin, 0, _) => ZERO,
        (Fonction::Sin, 1 | 5, 6) => DEMI,
        (Fonction::Sin, 7 | 11, 6) => MOINS_DEMI,
        (Fonction::Sin, 1 | 3, 4) => R2_2,
        (Fonction::Sin, 5 | 7, 4) => MOINS_R2_2,
        (Fonction::Sin, 1 | 2, 3) => R3_2,
        (Fonction::Sin, 4 | 5, 3) => MOINS_R3_2,
        (Fonction::Sin, 1, 2) => UN,
        (Fonction::Sin, 3, 2) => MOINS_UN,
        (Fonction::Sin, 1, 1) => ZERO,

        (Fonction::Cos, 0, _) => UN,
        (Fonction::Cos, 1, 1) => MOINS_UN,
        (Fonction::Cos, 1 | 11, 6) => R3_2,
        (Fonction::Cos, 5 | 7, 6) => MOINS_R3_2,
        (Fonction::Cos, 1 | 7, 4) => R2_2,
        (Fonction::Cos, 3 | 5, 4) => MOINS_R2_2,
        (Fonction::Cos, 1 | 5, 3) => DEMI,
        (Fonction::Cos, 2 | 4, 3) => MOINS_DEMI,
        (Fonction::Cos, 1 | 3, 2) => ZERO,

        (Fonction::Tan, 0, _) => ZERO,
        (Fonction::Tan, 1, 6) => R3_3,
        (Fonction::Tan, 5, 6) => MOINS_R3_3,
        (Fonction::Tan, 1, 4) => UN,
        (Fonction::Tan, 3, 4) => MOINS_UN,
        (Fonction::Tan, 1, 3) => R3,
        (Fonction::Tan, 2, 3) => MOINS_R3,
        (Fonction::Tan, 1, 2) => {
            tracing::debug!(fonction = f.nom(), angle = %format_angle(k, n), "valeur indéfinie");
            return Some(TrigOutcome::Indefini);
        }

        _ => return None,
    };

    let valeur = construire(forme);
    tracing::debug!(
        fonction = f.nom(),
        angle = %format_angle(k, n),
        valeur = %valeur,
        "angle remarquable"
    );
    Some(TrigOutcome::Valeur(valeur))
}

fn construire((signe, radicande, denominateur): Forme) -> Expr {
    let rat = |a: i64| Expr::Rat(BigRational::from_integer(BigInt::from(a)));

    if signe == 0 {
        return rat(0);
    }
    if radicande == 1 {
        return Expr::Rat(BigRational::new(
            BigInt::from(signe),
            BigInt::from(denominateur),
        ));
    }

    let racine = Expr::Appel(Fonction::Sqrt, Box::new(rat(radicande)));
    let valeur = if denominateur == 1 {
        racine
    } else {
        Expr::Div(Box::new(racine), Box::new(rat(denominateur)))
    };

    if signe < 0 {
        Expr::Neg(Box::new(valeur))
    } else {
        valeur
    }
}

/* ------------------------ Outils ------------------------ */

fn format_angle(k: i64, n: i64) -> String {
    match (k, n) {
        (0, _) => "0".to_string(),
        (1, 1) => "π".to_string(),
        (_, 1) => format!("{k}π"),
        (1, _) => format!("π/{n}"),
        _ => format!("{k}π/{n}"),
    }
}

/// Convertit un rationnel (déjà réduit) en (k,n) i64.
/// Accepte seulement n ∈ {1,2,3,4,6}.
fn rational_to_small_kn(r: &BigRational) -> Option<(i64, i64)> {
    let n = r.denom().to_i64()?;
    let k = r.numer().to_i64()?;

    if [1, 2, 3, 4, 6].contains(&n) {
        Some((k, n))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fois_pi(k: i64, n: i64) -> Expr {
        Expr::Div(
            Box::new(Expr::Mul(
                Box::new(Expr::Rat(BigRational::from_integer(k.into()))),
                Box::new(Expr::Pi),
            )),
            Box::new(Expr::Rat(BigRational::from_integer(n.into()))),
        )
    }

    fn rat(n: i64, d: i64) -> Expr {
        Expr::Rat(BigRational::new(n.into(), d.into()))
    }

    #[test]
    fn sinus_remarquables() {
        assert_eq!(
            trig_special(&fois_pi(1, 6), Fonction::Sin),
            Some(TrigOutcome::Valeur(rat(1, 2)))
        );
        assert_eq!(
            trig_special(&fois_pi(3, 2), Fonction::Sin),
            Some(TrigOutcome::Valeur(rat(-1, 1)))
        );
        // 13π/6 = 2π + π/6
        assert_eq!(
            trig_special(&fois_pi(13, 6), Fonction::Sin),
            Some(TrigOutcome::Valeur(rat(1, 2)))
        );
    }

    #[test]
    fn cosinus_negatif_reduit() {
        // -π/3 ≡ 5π/3
        assert_eq!(
            trig_special(&fois_pi(-1, 3), Fonction::Cos),
            Some(TrigOutcome::Valeur(rat(1, 2)))
        );
    }

    #[test]
    fn tangente_indefinie() {
        assert_eq!(
            trig_special(&fois_pi(1, 2), Fonction::Tan),
            Some(TrigOutcome::Indefini)
        );
        assert_eq!(
            trig_special(&fois_pi(-3, 2), Fonction::Tan),
            Some(TrigOutcome::Indefini)
        );
    }

    #[test]
    fn racines_dans_la_table() {
        let attendu = Expr::Div(
            Box::new(Expr::Appel(Fonction::Sqrt, Box::new(rat(2, 1)))),
            Box::new(rat(2, 1)),
        );
        assert_eq!(
            trig_special(&fois_pi(1, 4), Fonction::Sin),
            Some(TrigOutcome::Valeur(attendu))
        );
    }

    #[test]
    fn hors_table() {
        assert_eq!(trig_special(&fois_pi(1, 5), Fonction::Sin), None);
        assert_eq!(trig_special(&rat(1, 1), Fonction::Sin), None);
        assert_eq!(trig_special(&Expr::Var("x".into()), Fonction::Cos), None);
    }
}
