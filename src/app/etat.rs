//! src/app/etat.rs
//!
//! État UI (sans vue, sans noyau).
//!
//! Rôle : contenir l’état de l’extracteur (texte reconnu, dernier message,
//! chiffres, écoute vocale) et offrir des opérations simples (C/CLR/AC).
//!
//! Contrats :
//! - Aucune évaluation ici (pas de normalize, pas de parsing).
//! - Actions déterministes, sans effet de bord caché.
//! - Chiffres bornés par le noyau (1..=CHIFFRES_MAX).

use extracteur_math::capture::{EcouteVocale, ReconnaissanceVocale};
use extracteur_math::noyau::{Evaluation, Options, CHIFFRES_DEFAUT, CHIFFRES_MAX};

/// Fabrique d’un collaborateur vocal (un par écoute).
pub type SourceVocale = Box<dyn FnMut() -> Box<dyn ReconnaissanceVocale>>;

pub struct AppExtracteur {
    // --- entrée utilisateur ---
    pub texte: String, // texte reconnu (saisi, collé ou dicté)

    // --- sorties ---
    pub resultat: String, // message affichable (succès / échec / rien détecté)
    pub succes: bool,
    pub erreur: String, // erreur de capture (voix), jamais évaluée

    // --- paramètres ---
    pub chiffres: usize,

    // --- UX ---
    // Permet à vue.rs de redonner le focus à l’entrée après un clic sur un bouton.
    pub focus_entree: bool,

    // --- voix ---
    source_vocale: Option<SourceVocale>,
    ecoute: Option<EcouteVocale>,
}

impl Default for AppExtracteur {
    fn default() -> Self {
        Self {
            texte: String::new(),
            resultat: String::new(),
            succes: false,
            erreur: String::new(),
            chiffres: CHIFFRES_DEFAUT,
            focus_entree: true, // au lancement, on veut pouvoir taper tout de suite
            source_vocale: None,
            ecoute: None,
        }
    }
}

impl AppExtracteur {
    /// Active le bouton d’écoute avec un collaborateur vocal.
    ///
    /// Sans collaborateur, le bouton reste masqué ; en natif, `--voix-commande` en fournit un.
    pub fn avec_voix(mut self, source: SourceVocale) -> Self {
        self.source_vocale = Some(source);
        self
    }

    pub fn options(&self) -> Options {
        Options::avec_chiffres(self.chiffres)
    }

    /* ------------------------ Actions “boutons” (état seulement) ------------------------ */

    /// AC : remise à zéro totale (entrée + résultats + chiffres par défaut + écoute).
    pub fn reset_total(&mut self) {
        self.texte.clear();
        self.clear_resultats();
        self.chiffres = CHIFFRES_DEFAUT;
        self.annuler_ecoute();
        self.focus_entree = true;
    }

    /// C : effacer seulement l’entrée (sans toucher aux résultats).
    pub fn clear_entree(&mut self) {
        self.texte.clear();
        self.focus_entree = true;
    }

    /// CLR : effacer résultat + erreur (sans toucher à l’entrée).
    pub fn clear_resultats(&mut self) {
        self.resultat.clear();
        self.succes = false;
        self.erreur.clear();
        self.focus_entree = true;
    }

    /// Erreur de capture : on CONSERVE le dernier résultat affiché.
    pub fn set_erreur(&mut self, msg: impl Into<String>) {
        self.erreur = msg.into();
        self.focus_entree = true;
    }

    /// Dépose le message d’une évaluation.
    pub fn set_evaluation(&mut self, evaluation: &Evaluation) {
        self.erreur.clear();
        self.resultat = evaluation.to_string();
        self.succes = evaluation.est_succes();
        self.focus_entree = true;
    }

    pub fn set_chiffres(&mut self, chiffres: usize) {
        self.chiffres = chiffres.clamp(1, CHIFFRES_MAX);
        self.focus_entree = true;
    }

    /* ------------------------ Voix ------------------------ */

    pub fn voix_disponible(&self) -> bool {
        self.source_vocale.is_some()
    }

    pub fn ecoute_en_cours(&self) -> bool {
        self.ecoute.is_some()
    }

    /// Lance une écoute (remplace une écoute en cours, qui est annulée).
    pub fn lancer_ecoute(&mut self) {
        if !self.voix_disponible() {
            self.set_erreur("no speech recognizer configured");
            return;
        }
        self.annuler_ecoute();
        self.erreur.clear();
        if let Some(source) = self.source_vocale.as_mut() {
            self.ecoute = Some(EcouteVocale::lancer(source()));
        }
    }

    pub fn annuler_ecoute(&mut self) {
        if let Some(ecoute) = self.ecoute.take() {
            ecoute.annuler();
        }
    }

    /// Sondage non bloquant : Some(texte) une seule fois quand l’écoute réussit.
    /// Une écoute en échec dépose l’erreur et rend None.
    pub fn sonder_ecoute(&mut self) -> Option<String> {
        let resultat = self.ecoute.as_mut()?.essayer_resultat()?;
        self.ecoute = None;
        match resultat {
            Ok(texte) => {
                self.texte = texte.clone();
                Some(texte)
            }
            Err(e) => {
                self.set_erreur(e.to_string());
                None
            }
        }
    }
}
