//! Tests scientifiques (campagne) : texte reconnu -> normalize -> evaluate.
//!
//! Invariants vérifiés de bout en bout :
//! - un seul des trois messages (succès, échec, rien détecté)
//! - lecture à 15 chiffres significatifs (notation fixe / scientifique)
//! - angles remarquables : symétrie + périodicité
//! - erreurs numériques => message d’échec, jamais de panique

use std::time::{Duration, Instant};

use super::{evaluate, evaluer, normalize, ErreurEvaluation, Evaluation, Options, MESSAGE_VIDE};

fn resultat(expr: &str) -> String {
    match evaluer(expr, &Options::default()) {
        Evaluation::Succes { valeur, .. } => valeur,
        autre => panic!("expr={expr:?} : {autre:?}"),
    }
}

fn assert_echec(expr: &str) -> ErreurEvaluation {
    match evaluer(expr, &Options::default()) {
        Evaluation::Echec { erreur, .. } => erreur,
        autre => panic!("expr={expr:?} devrait échouer : {autre:?}"),
    }
}

/// Budget global anti-gel.
fn budget(start: Instant, max: Duration) {
    if start.elapsed() > max {
        panic!("budget temps dépassé: {:?}", max);
    }
}

/* ------------------------ Texte reconnu -> message ------------------------ */

#[test]
fn sci_chaine_complete() {
    assert_eq!(
        evaluate(&normalize("5 times 3")),
        "Extracted Expression: 5*3\nResult: 15.0000000000000"
    );
    assert_eq!(
        evaluate(&normalize("10 divided by 4")),
        "Extracted Expression: 10/4\nResult: 2.50000000000000"
    );
    assert_eq!(
        evaluate(&normalize("2 power 10")),
        "Extracted Expression: 2**10\nResult: 1024.00000000000"
    );
    assert_eq!(
        evaluate(&normalize("Sine(pi/6)")),
        "Extracted Expression: sin(pi/6)\nResult: 0.500000000000000"
    );
}

#[test]
fn sci_rien_detecte() {
    assert_eq!(evaluate(&normalize(None)), MESSAGE_VIDE);
    assert_eq!(evaluate(&normalize("")), MESSAGE_VIDE);
    assert_eq!(evaluate(&normalize("= ? !")), MESSAGE_VIDE);
}

#[test]
fn sci_textes_non_compris() {
    // fonction sans parenthèses
    let m = evaluate(&normalize("square root 9"));
    assert!(m.starts_with("Error evaluating expression: sqrt9\nCause: "), "{m}");

    // nombres en toutes lettres : non convertis
    let m = evaluate(&normalize("two plus two"));
    assert!(m.starts_with("Error evaluating expression: twoplustwo\nCause: "), "{m}");

    // "cosine" devient "cosin" (ordre de la table)
    let m = evaluate(&normalize("cosine(0)"));
    assert!(m.starts_with("Error evaluating expression: cosin(0)\nCause: "), "{m}");
}

/* ------------------------ Lecture décimale ------------------------ */

#[test]
fn sci_notation_fixe() {
    assert_eq!(resultat("2+2"), "4.00000000000000");
    assert_eq!(resultat("1/3"), "0.333333333333333");
    assert_eq!(resultat("2/3"), "0.666666666666667");
    assert_eq!(resultat("1/10000"), "0.000100000000000000");
    assert_eq!(resultat("100000000000000"), "100000000000000.");
    assert_eq!(resultat("pi"), "3.14159265358979");
    assert_eq!(resultat("2**0.5"), "1.41421356237310");
    assert_eq!(resultat("exp(1)"), "2.71828182845905");
    assert_eq!(resultat("log(10)"), "2.30258509299405");
    assert_eq!(resultat("atan(1)"), "0.785398163397448");
    assert_eq!(resultat("abs(-3)"), "3.00000000000000");
}

#[test]
fn sci_notation_scientifique() {
    assert_eq!(resultat("10**20"), "1.00000000000000e+20");
    assert_eq!(resultat("1/100000"), "1.00000000000000e-5");
    assert_eq!(resultat("1e-7"), "1.00000000000000e-7");
    assert_eq!(resultat("1e400"), "1.00000000000000e+400");
    assert_eq!(resultat("123456789012345678"), "1.23456789012346e+17");
    assert_eq!(resultat("999999999999999.5"), "1.00000000000000e+15");
}

#[test]
fn sci_grande_puissance_exacte() {
    assert_eq!(resultat("2**10000"), "1.99506311688076e+3010");
}

/* ------------------------ Angles remarquables ------------------------ */

#[test]
fn sci_symetrie() {
    assert_eq!(resultat("sin(-pi/4)"), "-0.707106781186548");
    assert_eq!(resultat("sin(pi/4)"), "0.707106781186548");
    assert_eq!(resultat("cos(-pi/3)"), resultat("cos(pi/3)"));
    assert_eq!(resultat("tan(-pi/6)"), "-0.577350269189626");
}

#[test]
fn sci_periodicite() {
    assert_eq!(resultat("sin(9*pi/4)"), resultat("sin(pi/4)"));
    assert_eq!(resultat("cos(7*pi/3)"), "0.500000000000000");
    assert_eq!(resultat("sin(pi/6+2*pi)"), "0.500000000000000");
    assert_eq!(resultat("tan(pi/4+pi)"), "1.00000000000000");
}

#[test]
fn sci_tangente_indefinie() {
    for s in ["tan(pi/2)", "tan(3*pi/2)", "tan(-pi/2)", "tan(pi/2+10*pi)"] {
        let e = assert_echec(s);
        assert_eq!(e.to_string(), "undefined result", "expr={s:?}");
    }
}

/* ------------------------ Symboles ------------------------ */

#[test]
fn sci_symboles() {
    assert_eq!(resultat("x+1"), "x + 1.0");
    assert_eq!(resultat("x-1"), "x - 1.0");
    assert_eq!(resultat("2*x"), "2.0*x");
    assert_eq!(resultat("x/2"), "0.5*x");
    assert_eq!(resultat("x**2"), "x**2");
    assert_eq!(resultat("(x+1)**2"), "(x + 1.0)**2");
    assert_eq!(resultat("-x"), "-x");
    assert_eq!(resultat("sin(x)"), "sin(x)");
    assert_eq!(resultat("2**x"), "2.0**x");
    assert_eq!(resultat("x*y"), "x*y");
    assert_eq!(resultat("a+b"), "a + b");
    assert_eq!(resultat("x**0.5"), "x**0.5");
}

/* ------------------------ Erreurs ------------------------ */

#[test]
fn sci_erreurs_numeriques() {
    let cas = [
        ("2/0", "division by zero"),
        ("1/(1-1)", "division by zero"),
        ("0**-1", "division by zero"),
        ("sqrt(-1)", "result is not a real number"),
        ("(-8)**(1/3)", "result is not a real number"),
        ("asin(2)", "result is not a real number"),
        ("log(0)", "undefined result"),
        ("exp(1000)", "numeric overflow"),
    ];
    for (s, cause) in cas {
        assert_eq!(
            evaluate(s),
            format!("Error evaluating expression: {s}\nCause: {cause}")
        );
    }
}

#[test]
fn sci_erreurs_syntaxe() {
    for s in ["2+*3", "2+", "(2+3", "2+3)", "sin()", "2(3)", "2x", "sqrt9", "sin", "*"] {
        assert!(
            matches!(assert_echec(s), ErreurEvaluation::Analyse(_)),
            "expr={s:?}"
        );
    }
}

/* ------------------------ Stress borné ------------------------ */

#[test]
fn sci_parentheses_profondes() {
    let start = Instant::now();
    let max = Duration::from_secs(2);

    let n = 200;
    let s = format!("{}1{}", "(".repeat(n), ")".repeat(n));
    assert_eq!(resultat(&s), "1.00000000000000");
    budget(start, max);

    let s = vec!["1"; 500].join("+");
    assert_eq!(resultat(&s), "500.000000000000");
    budget(start, max);
}

#[test]
fn sci_puissances_enormes_bornees() {
    let start = Instant::now();
    let max = Duration::from_secs(2);

    // trop grand pour le calcul exact : lecture flottante => dépassement
    let e = assert_echec("2**(10**10)");
    assert_eq!(e.to_string(), "numeric overflow");
    budget(start, max);

    // exposant littéral borné : même cause que 2**(10**10)
    assert_eq!(assert_echec("1e99999").to_string(), "numeric overflow");
    assert_eq!(assert_echec("1e5000*0").to_string(), "numeric overflow");
    budget(start, max);
}

#[test]
fn sci_entrees_longues_sans_abandon() {
    let start = Instant::now();
    let max = Duration::from_secs(5);
    let n = 100_000;
    let cause = "Cause: invalid syntax: expression too deeply nested (more than 512 levels)";

    let somme = vec!["1"; n].join("+");
    let moins = format!("{}1", "-".repeat(n));
    let appels = format!("{}1{}", "abs(".repeat(n), ")".repeat(n));
    let puissances = vec!["2"; n].join("**");

    for s in [&somme, &moins, &appels, &puissances] {
        let msg = evaluate(s);
        assert!(msg.starts_with("Error evaluating expression: "), "début={:?}", &s[..20]);
        assert!(msg.ends_with(cause), "début={:?}", &s[..20]);
        budget(start, max);
    }

    // largeur sans profondeur : toujours évaluable
    let large = format!("{}1{}", "(".repeat(n), ")".repeat(n));
    assert_eq!(resultat(&large), "1.00000000000000");
    budget(start, max);
}
