// src/noyau/normalisation.rs
//
// Texte reconnu (OCR / voix) -> expression normalisée
// ---------------------------------------------------
// 1) minuscules
// 2) table de substitutions (ordre FIXE, remplacement de sous-chaînes)
// 3) liste blanche : 0-9 + - * / ( ) . a-z ^
//
// Fonction totale : jamais d’erreur, au pire "".
//
// NOTE: l’ordre de la table fait partie du contrat. "sine" passe avant
// "cosine", donc "cosine" devient "cosin" (et la règle "cosine" ne voit plus rien).

/// Substitutions mot -> symbole, appliquées dans cet ordre exact.
pub const SUBSTITUTIONS: [(&str, &str); 10] = [
    ("sine", "sin"),
    ("cosine", "cos"),
    ("tangent", "tan"),
    ("logarithm", "log"),
    ("square root", "sqrt"),
    ("times", "*"),
    ("into", "*"),
    ("divided by", "/"),
    ("power", "**"),
    ("raise to", "**"),
];

/// Caractère autorisé dans une expression normalisée (liste blanche, ASCII).
pub fn est_autorise(c: char) -> bool {
    matches!(c, '0'..='9' | 'a'..='z' | '+' | '-' | '*' | '/' | '(' | ')' | '.' | '^')
}

/// Normalise un texte reconnu.
///
/// Accepte `&str` ou `Option<&str>` (`None` = texte vide).
///
/// ```
/// use extracteur_math::normalize;
///
/// assert_eq!(normalize("5 times 3"), "5*3");
/// assert_eq!(normalize("Square Root 9"), "sqrt9");
/// assert_eq!(normalize(None), "");
/// ```
pub fn normalize<'a>(brut: impl Into<Option<&'a str>>) -> String {
    let brut = brut.into().unwrap_or("");

    let mut texte = brut.to_lowercase();
    for (mot, symbole) in SUBSTITUTIONS {
        if texte.contains(mot) {
            texte = texte.replace(mot, symbole);
        }
    }

    let normalisee: String = texte.chars().filter(|&c| est_autorise(c)).collect();

    tracing::debug!(brut = %brut, normalisee = %normalisee, "texte normalisé");
    normalisee
}
