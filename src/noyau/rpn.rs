// src/noyau/rpn.rs
//
// Shunting-yard -> RPN -> AST
// Objectif:
// - Convertir une suite de Tok en RPN (postfix), en VALIDANT la syntaxe
// - Puis reconstruire Expr
//
// Règles:
// - Ident(name):
//    - fonction connue (sin, cos, ..., sqrt) => DOIT être suivie de '('
//    - une seule lettre => variable (Expr::Var)
//    - sinon => identifiant inconnu (erreur)
// - Moins unaire : jeton Neg (préfixe), précédence entre * / et **
//   => -2**2 = -(2**2), 2**-1 = 2**(-1), -2*3 = (-2)*3
// - Plus unaire : ignoré
// - Deux valeurs collées (2(3), 2x, sin(1)cos(1)) : opérateur manquant
// - Profondeur de l’arbre bornée (PROFONDEUR_MAX) : les passes sur Expr sont récursives

use super::eval::ErreurAnalyse;
use super::expr::{Expr, Fonction};
use super::jetons::Tok;

/// Profondeur maximale de l’arbre construit par `from_rpn`.
pub const PROFONDEUR_MAX: usize = 512;

fn precedence(t: &Tok) -> i32 {
    match t {
        Tok::Plus | Tok::Minus => 1,
        Tok::Star | Tok::Slash => 2,
        Tok::Neg => 3,
        Tok::Pow => 4,
        _ => 0,
    }
}

fn is_right_associative(t: &Tok) -> bool {
    matches!(t, Tok::Pow | Tok::Neg)
}

fn est_fonction(t: &Tok) -> bool {
    matches!(t, Tok::Ident(name) if Fonction::depuis_nom(name).is_some())
}

/// Identifiant utilisable comme variable : une seule lettre.
fn est_variable(name: &str) -> bool {
    let mut it = name.chars();
    matches!((it.next(), it.next()), (Some(c), None) if c.is_ascii_lowercase())
}

/// Convertit une suite de jetons en RPN (notation polonaise inversée).
///
/// Exemple:
///   tokens: [Ident("sin"), LPar, Pi, Slash, Num(2), RPar]
///   rpn:    [Pi, Num(2), Slash, Ident("sin")]
pub fn to_rpn(tokens: &[Tok]) -> Result<Vec<Tok>, ErreurAnalyse> {
    let mut out: Vec<Tok> = Vec::new();
    let mut ops: Vec<Tok> = Vec::new();

    // On attend une valeur (début, après un opérateur ou '(') ?
    let mut attend_valeur = true;

    for (idx, tok) in tokens.iter().cloned().enumerate() {
        let suivant = tokens.get(idx + 1);

        match tok {
            Tok::Num(_) | Tok::Pi => {
                if !attend_valeur {
                    return Err(ErreurAnalyse::OperateurManquant(tok.texte()));
                }
                out.push(tok);
                attend_valeur = false;
            }

            Tok::Ident(name) => {
                if !attend_valeur {
                    return Err(ErreurAnalyse::OperateurManquant(name));
                }
                if Fonction::depuis_nom(&name).is_some() {
                    // fonction : appel obligatoire avec parenthèses
                    if !matches!(suivant, Some(Tok::LPar)) {
                        return Err(ErreurAnalyse::FonctionSansParentheses(name));
                    }
                    ops.push(Tok::Ident(name));
                } else if est_variable(&name) {
                    out.push(Tok::Ident(name));
                    attend_valeur = false;
                } else {
                    return Err(ErreurAnalyse::IdentifiantInconnu(name));
                }
            }

            Tok::LPar => {
                if !attend_valeur {
                    return Err(ErreurAnalyse::OperateurManquant("(".into()));
                }
                ops.push(tok);
            }

            Tok::RPar => {
                if attend_valeur {
                    let precedent = idx.checked_sub(1).and_then(|p| tokens.get(p));
                    return Err(match precedent {
                        Some(Tok::LPar) => ErreurAnalyse::ParenthesesVides,
                        _ => ErreurAnalyse::OperateurInattendu(")".into()),
                    });
                }

                // dépile jusqu’à '('
                let mut ouvrante = false;
                while let Some(top) = ops.pop() {
                    if matches!(top, Tok::LPar) {
                        ouvrante = true;
                        break;
                    }
                    out.push(top);
                }
                if !ouvrante {
                    return Err(ErreurAnalyse::ParentheseFermanteInattendue);
                }

                // si une fonction est au sommet, elle sort avec son argument
                if ops.last().is_some_and(est_fonction) {
                    if let Some(f) = ops.pop() {
                        out.push(f);
                    }
                }

                attend_valeur = false;
            }

            Tok::Plus | Tok::Minus if attend_valeur => {
                // unaire : '-' devient Neg (préfixe), '+' ne change rien
                if matches!(tok, Tok::Minus) {
                    ops.push(Tok::Neg);
                }
            }

            Tok::Plus | Tok::Minus | Tok::Star | Tok::Slash | Tok::Pow => {
                if attend_valeur {
                    return Err(ErreurAnalyse::OperateurInattendu(tok.texte()));
                }

                // dépile tant que:
                // - on n'est pas bloqué par '(' ni par une fonction
                // - et la précédence/associativité exige de sortir l'opérateur du haut
                while let Some(top) = ops.last() {
                    if matches!(top, Tok::LPar) || est_fonction(top) {
                        break;
                    }

                    let p_top = precedence(top);
                    let p_tok = precedence(&tok);

                    let doit_pop = if is_right_associative(&tok) {
                        p_top > p_tok
                    } else {
                        p_top >= p_tok
                    };

                    if !doit_pop {
                        break;
                    }
                    if let Some(op) = ops.pop() {
                        out.push(op);
                    }
                }

                ops.push(tok);
                attend_valeur = true;
            }

            Tok::Neg => return Err(ErreurAnalyse::OperateurInattendu(tok.texte())),
        }
    }

    if attend_valeur {
        return Err(ErreurAnalyse::FinInattendue);
    }

    // vide la pile ops
    while let Some(op) = ops.pop() {
        if matches!(op, Tok::LPar) {
            return Err(ErreurAnalyse::ParenthesesNonFermees);
        }
        out.push(op);
    }

    verifier_profondeur(&out)?;
    Ok(out)
}

/// Simule la construction de l’arbre sur une pile de profondeurs (sans allouer d’Expr).
fn verifier_profondeur(rpn: &[Tok]) -> Result<(), ErreurAnalyse> {
    let mut pile: Vec<usize> = Vec::new();

    for tok in rpn {
        let profondeur = match tok {
            Tok::Num(_) | Tok::Pi => 1,
            Tok::Ident(_) if !est_fonction(tok) => 1,
            Tok::Neg | Tok::Ident(_) => pile.pop().unwrap_or(0) + 1,
            _ => {
                let b = pile.pop().unwrap_or(0);
                let a = pile.pop().unwrap_or(0);
                a.max(b) + 1
            }
        };
        if profondeur > PROFONDEUR_MAX {
            return Err(ErreurAnalyse::ExpressionTropProfonde(PROFONDEUR_MAX));
        }
        pile.push(profondeur);
    }
    Ok(())
}

/// Construit une Expr à partir d’une RPN validée par `to_rpn`.
pub fn from_rpn(rpn: &[Tok]) -> Result<Expr, ErreurAnalyse> {
    let mut st: Vec<Expr> = Vec::new();

    for tok in rpn.iter().cloned() {
        match tok {
            Tok::Num(r) => st.push(Expr::Rat(r)),
            Tok::Pi => st.push(Expr::Pi),

            Tok::Neg => {
                let x = st.pop().ok_or(ErreurAnalyse::ExpressionInvalide)?;
                st.push(Expr::Neg(Box::new(x)));
            }

            Tok::Plus | Tok::Minus | Tok::Star | Tok::Slash | Tok::Pow => {
                let b = st.pop().ok_or(ErreurAnalyse::ExpressionInvalide)?;
                let a = st.pop().ok_or(ErreurAnalyse::ExpressionInvalide)?;
                let (a, b) = (Box::new(a), Box::new(b));

                st.push(match tok {
                    Tok::Plus => Expr::Add(a, b),
                    Tok::Minus => Expr::Sub(a, b),
                    Tok::Star => Expr::Mul(a, b),
                    Tok::Slash => Expr::Div(a, b),
                    _ => Expr::Pow(a, b),
                });
            }

            Tok::Ident(name) => match Fonction::depuis_nom(&name) {
                Some(f) => {
                    let x = st.pop().ok_or(ErreurAnalyse::ExpressionInvalide)?;
                    st.push(Expr::Appel(f, Box::new(x)));
                }
                None => st.push(Expr::Var(name)),
            },

            Tok::LPar | Tok::RPar => return Err(ErreurAnalyse::ExpressionInvalide),
        }
    }

    match (st.pop(), st.is_empty()) {
        (Some(e), true) => Ok(e),
        _ => Err(ErreurAnalyse::ExpressionInvalide),
    }
}
