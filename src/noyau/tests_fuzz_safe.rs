//! Tests fuzz safe : robustesse + déterminisme + limites contrôlées.
//!
//! But : marteler normalize + evaluate sans brûler la machine.
//! - RNG déterministe (seed fixe)
//! - profondeur bornée
//! - budget temps global
//! - invariant clé : toute sortie est l’un des trois messages, sans panique

use std::time::{Duration, Instant};

use super::normalisation::est_autorise;
use super::{evaluate, evaluer, normalize, Evaluation, Options, MESSAGE_VIDE};

/* ------------------------ RNG déterministe minimal ------------------------ */

#[derive(Clone)]
struct Rng {
    state: u64,
}
impl Rng {
    fn new(seed: u64) -> Self {
        Self { state: seed }
    }
    fn next_u32(&mut self) -> u32 {
        // LCG simple (déterministe)
        self.state = self.state.wrapping_mul(6364136223846793005).wrapping_add(1);
        (self.state >> 32) as u32
    }
    fn pick(&mut self, n: u32) -> u32 {
        if n == 0 {
            0
        } else {
            self.next_u32() % n
        }
    }
    fn choisir<'a>(&mut self, items: &[&'a str]) -> &'a str {
        items[self.pick(items.len() as u32) as usize]
    }
}

/* ------------------------ Budget anti-gel ------------------------ */

fn budget(start: Instant, max: Duration) {
    if start.elapsed() > max {
        panic!("budget temps dépassé: {:?}", max);
    }
}

/* ------------------------ Helpers fuzz ------------------------ */

fn message_valide(expr: &str, msg: &str) -> bool {
    msg == MESSAGE_VIDE
        || msg.starts_with(&format!("Extracted Expression: {expr}\nResult: "))
        || msg.starts_with(&format!("Error evaluating expression: {expr}\nCause: "))
}

/* ------------------------ Génération de texte “reconnu” ------------------------ */

const MORCEAUX: [&str; 28] = [
    "1", "2", "3", "7", "0", "42", "3.5", " ", " ", "+", "-", "*", "/", "(", ")", "^",
    " times ", " divided by ", " power ", "sine", "cosine", "square root", "pi", "x",
    "×", "=", "?", "É",
];

fn gen_texte(rng: &mut Rng) -> String {
    let n = 1 + rng.pick(12);
    (0..n).map(|_| rng.choisir(&MORCEAUX)).collect()
}

/* ------------------------ Génération d’expressions (bornée) ------------------------ */

fn gen_rat(rng: &mut Rng) -> String {
    let a = rng.pick(8);
    let b = 1 + rng.pick(8);
    if rng.pick(2) == 0 {
        format!("{a}/{b}")
    } else {
        format!("{a}")
    }
}

fn gen_coeff_pi(rng: &mut Rng) -> String {
    let k = rng.pick(14) as i64 - 6;
    let d = rng.choisir(&["1", "2", "3", "4", "6", "12"]);
    format!("{k}*pi/{d}")
}

fn gen_atom(rng: &mut Rng) -> String {
    match rng.pick(5) {
        0 => gen_rat(rng),
        1 => "pi".to_string(),
        2 => format!("({})", gen_coeff_pi(rng)),
        3 => "x".to_string(),
        _ => rng.choisir(&["sqrt(2)", "sqrt(3)", "sqrt(-1)"]).to_string(),
    }
}

fn gen_expr(rng: &mut Rng, depth: usize) -> String {
    if depth == 0 {
        return gen_atom(rng);
    }

    match rng.pick(9) {
        0 => gen_atom(rng),
        1..=5 => {
            let op = rng.choisir(&["+", "-", "*", "/", "**"]);
            format!(
                "({}{op}{})",
                gen_expr(rng, depth - 1),
                gen_expr(rng, depth - 1)
            )
        }
        6 => format!("-{}", gen_expr(rng, depth - 1)),
        7 => {
            let f = rng.choisir(&["sin", "cos", "tan"]);
            format!("{f}({})", gen_coeff_pi(rng))
        }
        _ => {
            let f = rng.choisir(&["log", "exp", "abs", "atan", "sqrt"]);
            format!("{f}({})", gen_expr(rng, depth - 1))
        }
    }
}

/* ------------------------ Helper somme balancée anti pile ------------------------ */

fn somme_balancee(terme: &str, n: usize) -> String {
    let mut items: Vec<String> = (0..n).map(|_| terme.to_string()).collect();
    while items.len() > 1 {
        let mut next = Vec::new();
        let mut i = 0;
        while i < items.len() {
            if i + 1 < items.len() {
                next.push(format!("({}+{})", items[i], items[i + 1]));
                i += 2;
            } else {
                next.push(items[i].clone());
                i += 1;
            }
        }
        items = next;
    }
    items.pop().unwrap_or_else(|| "0".to_string())
}

/* ------------------------ Tests ------------------------ */

#[test]
fn fuzz_safe_texte_reconnu() {
    let t0 = Instant::now();
    let max = Duration::from_secs(2);

    let mut rng = Rng::new(0xC0FFEE_u64);

    let mut vus = [0usize; 3];

    for _ in 0..400 {
        budget(t0, max);

        let brut = gen_texte(&mut rng);
        let expr = normalize(brut.as_str());
        assert!(expr.chars().all(est_autorise), "brut={brut:?} expr={expr:?}");

        let msg = evaluate(&expr);
        assert!(message_valide(&expr, &msg), "brut={brut:?} msg={msg:?}");

        match evaluer(&expr, &Options::default()) {
            Evaluation::Vide => vus[0] += 1,
            Evaluation::Succes { .. } => vus[1] += 1,
            Evaluation::Echec { .. } => vus[2] += 1,
        }
    }

    // On veut voir les trois issues, sinon le fuzz ne “balaye” rien.
    assert!(vus.iter().all(|&n| n > 0), "issues vues: {vus:?}");
}

#[test]
fn fuzz_safe_determinisme() {
    let t0 = Instant::now();
    let max = Duration::from_secs(2);

    let mut a = Rng::new(0xBADC0DE_u64);
    let mut b = a.clone();

    for _ in 0..150 {
        budget(t0, max);

        let ea = gen_expr(&mut a, 4);
        let eb = gen_expr(&mut b, 4);
        assert_eq!(ea, eb);
        assert_eq!(evaluate(&ea), evaluate(&eb), "expr={ea:?}");
    }
}

#[test]
fn fuzz_safe_expressions_structurees() {
    let t0 = Instant::now();
    let max = Duration::from_secs(3);

    let mut rng = Rng::new(0x5EED_u64);

    let mut ok = 0usize;
    let mut err = 0usize;

    for _ in 0..200 {
        budget(t0, max);

        let expr = gen_expr(&mut rng, 5);
        match evaluer(&expr, &Options::default()) {
            Evaluation::Succes { valeur, .. } => {
                assert!(!valeur.is_empty(), "expr={expr:?}");
                assert!(!valeur.contains("inf") && !valeur.contains("NaN"), "expr={expr:?} valeur={valeur:?}");
                ok += 1;
            }
            Evaluation::Echec { .. } => err += 1,
            Evaluation::Vide => panic!("expr non vide jugée vide: {expr:?}"),
        }
    }

    assert!(ok > 10, "trop peu de succès: {ok}");
    assert!(err > 0, "aucune erreur vue: fuzz trop “sage”");
}

#[test]
fn fuzz_safe_angles_tan() {
    let mut rng = Rng::new(0xA11CE_u64);

    for _ in 0..100 {
        let a = gen_coeff_pi(&mut rng);
        let expr = format!("tan({a})");
        let msg = evaluate(&expr);
        assert!(message_valide(&expr, &msg), "msg={msg:?}");
        // seule erreur possible : tan(π/2 + kπ)
        if msg.starts_with("Error") {
            assert!(msg.ends_with("Cause: undefined result"), "msg={msg:?}");
        }
    }
}

#[test]
fn fuzz_safe_somme_balancee_anti_pile() {
    let t0 = Instant::now();
    let max = Duration::from_secs(1);

    let expr = somme_balancee("1/2", 800);
    budget(t0, max);

    // 800*(1/2) = 400
    assert_eq!(
        evaluate(&expr),
        format!("Extracted Expression: {expr}\nResult: 400.000000000000")
    );
    budget(t0, max);
}
