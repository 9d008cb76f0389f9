// src/app/vue.rs
//
// Vue (UI egui): natif + web
// ---------------------------
// Objectifs :
// - Même AppExtracteur (etat.rs) pour natif + wasm
// - Clavier : Enter évalue (quand le champ est focus)
// - Aperçu en direct de l’expression normalisée
// - Boutons “mots parlés” (times, divided by, ...) : on tape comme l’OCR / la voix
//
// Note :
// - PAS de Key::NumEnter (n’existe pas dans egui 0.33.x)

use eframe::egui;

use extracteur_math::capture::depuis_texte;
use extracteur_math::noyau::{normalize, CHIFFRES_MAX};

use super::etat::AppExtracteur;

/// Mots de la table de normalisation, proposés en boutons.
const MOTS: [&str; 8] = [
    "times",
    "into",
    "divided by",
    "power",
    "square root",
    "sine",
    "tangent",
    "logarithm",
];

impl AppExtracteur {
    /// UI principale : à appeler depuis eframe::App::update(...)
    pub fn ui(&mut self, ui: &mut egui::Ui) {
        ui.spacing_mut().item_spacing = egui::vec2(6.0, 6.0);

        // Écoute vocale : on sonde à chaque frame, et on redessine tant qu’elle tourne.
        if self.sonder_ecoute().is_some() {
            self.eval_via_noyau();
        }
        if self.ecoute_en_cours() {
            ui.ctx().request_repaint();
        }

        egui::ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| {
                ui.heading("Extracteur d’expressions mathématiques");
                ui.add_space(6.0);

                self.ui_entree(ui);

                ui.add_space(8.0);
                ui.separator();
                ui.add_space(8.0);

                self.ui_resultat(ui);
            });
    }

    fn ui_entree(&mut self, ui: &mut egui::Ui) {
        ui.label("Texte reconnu :");

        let resp = ui.add(
            egui::TextEdit::singleline(&mut self.texte)
                .desired_width(ui.available_width())
                .hint_text("Ex: 5 times 3, square root(16), sine(pi/6)")
                .id_source("texte_edit"),
        );

        if self.focus_entree {
            resp.request_focus();
            self.focus_entree = false;
        }

        let enter = ui.input(|i| i.key_pressed(egui::Key::Enter));
        if resp.has_focus() && enter {
            self.eval_via_noyau();
        }

        ui.add_space(4.0);
        ui.label("Expression normalisée :");
        let apercu = normalize(self.texte.as_str());
        Self::champ_monospace(ui, "apercu_out", &apercu, 1);

        ui.add_space(6.0);

        ui.horizontal(|ui| {
            // Contrat: C = entrée seulement ; CLR = résultat seulement ; AC = tout
            self.bouton_action(ui, "C", "Efface seulement l’entrée", Action::ClearEntree);
            self.bouton_action(ui, "CLR", "Efface le résultat", Action::ClearResultats);
            self.bouton_action(ui, "AC", "Remise à zéro totale", Action::ResetTotal);

            ui.separator();

            ui.label("Chiffres :");
            let mut d = self.chiffres as u32;
            let resp = ui.add(
                egui::DragValue::new(&mut d)
                    .speed(1)
                    .range(1..=CHIFFRES_MAX as u32),
            );
            if resp.changed() {
                self.set_chiffres(d as usize);
            }

            if self.voix_disponible() {
                ui.separator();
                if self.ecoute_en_cours() {
                    ui.spinner();
                    self.bouton_action(ui, "Stop", "Annule l’écoute", Action::AnnulerEcoute);
                } else {
                    self.bouton_action(ui, "Voix", "Dicter une expression", Action::Ecouter);
                }
            }
        });

        ui.add_space(8.0);

        ui.horizontal_wrapped(|ui| {
            for mot in MOTS {
                self.bouton_insert(ui, mot, mot, InsertKind::Mot);
            }
        });

        ui.horizontal_wrapped(|ui| {
            self.bouton_insert(ui, "(", "(", InsertKind::Symbole);
            self.bouton_insert(ui, ")", ")", InsertKind::Symbole);
            self.bouton_insert(ui, "+", "+", InsertKind::Symbole);
            self.bouton_insert(ui, "-", "-", InsertKind::Symbole);
            self.bouton_insert(ui, "^", "^", InsertKind::Symbole);
            self.bouton_insert(ui, "pi", "pi", InsertKind::Symbole);
            self.bouton_insert(ui, "x", "x", InsertKind::Symbole);

            ui.add_space(10.0);

            let eq = ui.add_sized([64.0, 32.0], egui::Button::new("="));
            if eq.clicked() {
                self.eval_via_noyau();
            }
        });

        ui.add_space(8.0);

        self.ui_pave_numerique(ui);

        if !self.erreur.is_empty() {
            ui.add_space(6.0);
            ui.colored_label(ui.visuals().warn_fg_color, &self.erreur);
        }
    }

    fn ui_pave_numerique(&mut self, ui: &mut egui::Ui) {
        egui::Grid::new("pave_numerique")
            .num_columns(4)
            .spacing([6.0, 6.0])
            .show(ui, |ui| {
                for ligne in [["7", "8", "9"], ["4", "5", "6"], ["1", "2", "3"]] {
                    for c in ligne {
                        self.bouton_insert(ui, c, c, InsertKind::Symbole);
                    }
                    ui.end_row();
                }
                self.bouton_insert(ui, "0", "0", InsertKind::Symbole);
                self.bouton_insert(ui, ".", ".", InsertKind::Symbole);
                self.bouton_action(ui, "DEL", "Efface le dernier caractère", Action::Backspace);
                ui.end_row();
            });
    }

    fn ui_resultat(&mut self, ui: &mut egui::Ui) {
        ui.label("Résultat :");
        if self.succes || self.resultat.is_empty() {
            Self::champ_monospace(ui, "resultat_out", &self.resultat, 2);
        } else {
            egui::Frame::group(ui.style()).show(ui, |ui| {
                ui.set_min_width(ui.available_width());
                ui.colored_label(
                    ui.visuals().error_fg_color,
                    egui::RichText::new(&self.resultat).monospace(),
                );
            });
        }
    }

    fn champ_monospace(ui: &mut egui::Ui, id: &str, contenu: &str, rows: usize) {
        // Affichage lecture seule “stable”, sans TextEdit interactif.
        egui::Frame::group(ui.style())
            .fill(ui.visuals().extreme_bg_color)
            .show(ui, |ui| {
                ui.push_id(id, |ui| {
                    ui.set_min_width(ui.available_width());
                    ui.set_min_height(
                        rows as f32 * ui.text_style_height(&egui::TextStyle::Monospace),
                    );
                    ui.monospace(contenu);
                });
            });
    }

    fn bouton_action(&mut self, ui: &mut egui::Ui, label: &str, tip: &str, action: Action) {
        let resp = ui
            .add_sized([56.0, 30.0], egui::Button::new(label))
            .on_hover_text(tip);

        if resp.clicked() {
            match action {
                Action::ClearEntree => self.clear_entree(),
                Action::ClearResultats => self.clear_resultats(),
                Action::ResetTotal => self.reset_total(),
                Action::Backspace => {
                    self.texte.pop();
                }
                Action::Ecouter => self.lancer_ecoute(),
                Action::AnnulerEcoute => self.annuler_ecoute(),
            }
            self.focus_entree = true;
        }
    }

    fn bouton_insert(&mut self, ui: &mut egui::Ui, label: &str, to_insert: &str, kind: InsertKind) {
        let resp = ui.add_sized([46.0, 28.0], egui::Button::new(label));
        if resp.clicked() {
            self.inserer(to_insert, kind);
        }
    }

    /// Insère dans le texte reconnu. Les mots sont entourés d’espaces,
    /// comme dans une phrase dictée ("5 times 3").
    fn inserer(&mut self, to_insert: &str, kind: InsertKind) {
        match kind {
            InsertKind::Mot => {
                if !self.texte.is_empty() && !self.texte.ends_with(' ') {
                    self.texte.push(' ');
                }
                self.texte.push_str(to_insert);
                self.texte.push(' ');
            }
            InsertKind::Symbole => self.texte.push_str(to_insert),
        }
        self.focus_entree = true;
    }

    /// Texte reconnu -> normalize -> evaluer, puis dépose le message dans l’état UI.
    fn eval_via_noyau(&mut self) {
        let evaluation = depuis_texte(&self.texte, &self.options());
        self.set_evaluation(&evaluation);
    }
}

#[derive(Clone, Copy, Debug)]
enum Action {
    ClearEntree,
    ClearResultats,
    ResetTotal,
    Backspace,
    Ecouter,
    AnnulerEcoute,
}

#[derive(Clone, Copy, Debug)]
enum InsertKind {
    Mot,
    Symbole,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mots_inseres_comme_une_phrase() {
        let mut app = AppExtracteur::default();
        app.inserer("5", InsertKind::Symbole);
        app.inserer("times", InsertKind::Mot);
        app.inserer("3", InsertKind::Symbole);
        assert_eq!(app.texte, "5 times 3");
        assert_eq!(normalize(app.texte.as_str()), "5*3");
    }

    #[test]
    fn evaluation_depuis_l_etat() {
        let mut app = AppExtracteur::default();
        app.texte = "10 divided by 4".into();
        app.eval_via_noyau();
        assert!(app.succes);
        assert_eq!(
            app.resultat,
            "Extracted Expression: 10/4\nResult: 2.50000000000000"
        );

        app.set_chiffres(3);
        app.texte = "1/3".into();
        app.eval_via_noyau();
        assert_eq!(app.resultat, "Extracted Expression: 1/3\nResult: 0.333");
    }

    #[test]
    fn echec_affiche_la_cause() {
        let mut app = AppExtracteur::default();
        app.texte = "2 divided by 0".into();
        app.eval_via_noyau();
        assert!(!app.succes);
        assert_eq!(
            app.resultat,
            "Error evaluating expression: 2/0\nCause: division by zero"
        );
    }
}
