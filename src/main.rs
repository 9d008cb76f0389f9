// src/main.rs
//
// Extracteur d’expressions: point d’entrée NATIF + WEB (WASM)
// ------------------------------------------------------------
// - NATIF : ligne de commande (--texte / --stdin / --image / --ecouter), sinon fenêtre eframe
// - WEB   : eframe::WebRunner + <canvas id="the_canvas_id">

#![cfg_attr(target_arch = "wasm32", allow(unused_imports))]

use eframe::egui;

mod app;

use app::AppExtracteur;

/// Titre unique (natif + web).
const TITRE_APP: &str = "Extracteur d’expressions mathématiques";

/* ------------------------ Entrée NATIF (PC) ------------------------ */

#[cfg(not(target_arch = "wasm32"))]
mod natif {
    use std::fs;
    use std::io::{self, BufRead, Write};
    use std::path::PathBuf;

    use anyhow::Context;
    use clap::Parser;
    use tracing_subscriber::EnvFilter;

    use extracteur_math::capture::{
        depuis_image, depuis_texte, EcouteVocale, ImageGris, ReconnaissanceVocale,
    };
    use extracteur_math::externe::CommandeExterne;
    use extracteur_math::noyau::{normalize, Options, CHIFFRES_DEFAUT};

    use crate::app::etat::SourceVocale;

    /// Texte reconnu (OCR / voix / saisie) -> expression -> résultat.
    ///
    /// Sans --texte ni --stdin, ouvre la fenêtre.
    #[derive(Parser, Debug)]
    #[command(name = "extracteur_math", version, about)]
    pub struct Args {
        /// Texte à évaluer (répétable)
        #[arg(short, long = "texte")]
        pub textes: Vec<String>,

        /// Lit un texte par ligne sur l’entrée standard
        #[arg(long)]
        pub stdin: bool,

        /// Chiffres significatifs des résultats numériques (1..=15)
        #[arg(short, long, default_value_t = CHIFFRES_DEFAUT)]
        pub chiffres: usize,

        /// Affiche seulement l’expression normalisée
        #[arg(short, long)]
        pub normaliser: bool,

        /// Journalisation détaillée (jetons, RPN, arbre)
        #[arg(short, long)]
        pub verbeux: bool,

        /// Commande de reconnaissance vocale (texte sur stdout) ; active le bouton "Voix"
        #[arg(long, value_name = "COMMANDE")]
        pub voix_commande: Option<String>,

        /// Une seule écoute avec --voix-commande, puis affiche le message
        #[arg(long, requires = "voix_commande")]
        pub ecouter: bool,

        /// Image PGM (P5) à passer à --ocr-commande (répétable)
        #[arg(long = "image", value_name = "FICHIER", requires = "ocr_commande")]
        pub images: Vec<PathBuf>,

        /// Commande OCR : reçoit le chemin d’un PGM binarisé, écrit le texte sur stdout
        #[arg(long, value_name = "COMMANDE")]
        pub ocr_commande: Option<String>,
    }

    impl Args {
        pub fn mode_texte(&self) -> bool {
            self.stdin || self.ecouter || !self.textes.is_empty() || !self.images.is_empty()
        }

        fn commande(ligne: &Option<String>, option: &str) -> anyhow::Result<Option<CommandeExterne>> {
            match ligne {
                None => Ok(None),
                Some(l) => CommandeExterne::depuis_ligne(l)
                    .map(Some)
                    .with_context(|| format!("{option} : commande vide")),
            }
        }

        /// Fabrique de collaborateurs vocaux pour la fenêtre.
        pub fn source_vocale(&self) -> anyhow::Result<Option<SourceVocale>> {
            let commande = Self::commande(&self.voix_commande, "--voix-commande")?;
            Ok(commande.map(|c| -> SourceVocale {
                Box::new(move || Box::new(c.clone()) as Box<dyn ReconnaissanceVocale>)
            }))
        }
    }

    pub fn installer_traces(verbeux: bool) {
        let defaut = if verbeux { "debug" } else { "info" };
        let filtre = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(defaut));
        // Les traces vont sur stderr : stdout reste réservé aux messages.
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filtre)
            .with_writer(io::stderr)
            .try_init();
    }

    fn traiter(brut: &str, args: &Args, options: &Options, sortie: &mut impl Write) -> anyhow::Result<()> {
        if args.normaliser {
            writeln!(sortie, "{}", normalize(brut))?;
        } else {
            writeln!(sortie, "{}", depuis_texte(brut, options))?;
        }
        Ok(())
    }

    pub fn executer_textes(args: &Args) -> anyhow::Result<()> {
        let options = Options::avec_chiffres(args.chiffres);
        let stdout = io::stdout();
        let mut sortie = stdout.lock();

        for brut in &args.textes {
            traiter(brut, args, &options, &mut sortie)?;
        }

        if let Some(ocr) = Args::commande(&args.ocr_commande, "--ocr-commande")? {
            for chemin in &args.images {
                let octets = fs::read(chemin)
                    .with_context(|| format!("lecture de {}", chemin.display()))?;
                let image = ImageGris::depuis_pgm(&octets)
                    .with_context(|| format!("image {}", chemin.display()))?;
                let evaluation = depuis_image(&ocr, &image, &options)
                    .with_context(|| format!("OCR de {}", chemin.display()))?;
                writeln!(sortie, "{evaluation}")?;
            }
        }

        if args.ecouter {
            if let Some(voix) = Args::commande(&args.voix_commande, "--voix-commande")? {
                let evaluation = EcouteVocale::lancer(voix)
                    .evaluer(&options)
                    .context("écoute vocale")?;
                writeln!(sortie, "{evaluation}")?;
            }
        }

        if args.stdin {
            for ligne in io::stdin().lock().lines() {
                let ligne = ligne.context("lecture de l’entrée standard")?;
                traiter(&ligne, args, &options, &mut sortie)?;
            }
        }
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> anyhow::Result<()> {
    use clap::Parser;

    let args = natif::Args::parse();
    natif::installer_traces(args.verbeux);

    if args.mode_texte() {
        return natif::executer_textes(&args);
    }

    let chiffres = args.chiffres;
    let source_vocale = args.source_vocale()?;
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(TITRE_APP)
            .with_inner_size([560.0, 720.0])
            .with_min_inner_size([420.0, 560.0]),
        ..Default::default()
    };

    eframe::run_native(
        TITRE_APP,
        options,
        Box::new(move |_cc| {
            let mut app = AppExtracteur::default();
            if let Some(source) = source_vocale {
                app = app.avec_voix(source);
            }
            app.set_chiffres(chiffres);
            Ok(Box::new(app))
        }),
    )
    .map_err(|e| anyhow::anyhow!("fenêtre eframe: {e}"))
}

/* ------------------------ Entrée WEB (WASM) ------------------------ */

#[cfg(target_arch = "wasm32")]
fn main() {
    // En wasm32, le démarrage réel passe par `start()` (wasm_bindgen).
}

#[cfg(target_arch = "wasm32")]
mod web {
    use super::{AppExtracteur, TITRE_APP};

    use wasm_bindgen::JsCast;
    use web_sys::{window, HtmlCanvasElement};

    /// ID du canvas attendu dans index.html.
    const CANVAS_ID: &str = "the_canvas_id";

    #[wasm_bindgen::prelude::wasm_bindgen(start)]
    pub async fn start() -> Result<(), wasm_bindgen::JsValue> {
        let w = window().ok_or_else(|| js_err("window() indisponible"))?;
        let d = w
            .document()
            .ok_or_else(|| js_err("document() indisponible"))?;

        d.set_title(TITRE_APP);

        let el = d
            .get_element_by_id(CANVAS_ID)
            .ok_or_else(|| js_err("canvas introuvable (id incorrect dans index.html)"))?;

        let canvas: HtmlCanvasElement = el
            .dyn_into::<HtmlCanvasElement>()
            .map_err(|_| js_err("l’élément trouvé n’est pas un <canvas>"))?;

        eframe::WebRunner::new()
            .start(
                canvas,
                eframe::WebOptions::default(),
                Box::new(|_cc| Ok(Box::<AppExtracteur>::default())),
            )
            .await
    }

    fn js_err(msg: &str) -> wasm_bindgen::JsValue {
        wasm_bindgen::JsValue::from_str(msg)
    }
}
