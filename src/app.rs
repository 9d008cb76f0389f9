// src/app.rs
//
// Extracteur d’expressions: module App (racine)
// ----------------------------------------------
// Rôle:
// - Déclarer les sous-modules (etat.rs + vue.rs)
// - Ré-exporter AppExtracteur (pour main.rs: use app::AppExtracteur;)
// - Fournir l’impl eframe::App (compatible NATIF + WEB)
//
// Important:
// - Enter est géré dans vue.rs (quand le champ a le focus).
// - Le sondage de l’écoute vocale est fait dans vue.rs, à chaque frame.

pub mod etat;
pub mod vue;

pub use etat::AppExtracteur;

use eframe::egui;

impl eframe::App for AppExtracteur {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ESC : annule une écoute en cours, sinon efface l’entrée (comme "C").
        let esc = ctx.input(|i| i.key_pressed(egui::Key::Escape));
        if esc {
            if self.ecoute_en_cours() {
                self.annuler_ecoute();
            } else {
                self.clear_entree();
            }
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            self.ui(ui);
        });
    }
}
