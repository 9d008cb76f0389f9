// src/capture.rs
//
// Collaborateurs de reconnaissance (OCR, voix) + branchement sur le noyau
// ----------------------------------------------------------------------
// Le noyau ne voit que du texte : une capture qui échoue n’appelle jamais evaluate.
//
// Voix : une tâche de fond annulable, un seul résultat rendu par canal.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::sync::Arc;
use std::thread::JoinHandle;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::noyau::{evaluer, normalize, Evaluation, Options};

/// Seuil de binarisation avant OCR (pixel > seuil => fond).
pub const SEUIL_BINARISATION: u8 = 128;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ErreurCapture {
    #[error("could not understand the audio")]
    NonCompris,
    #[error("speech recognition service unavailable: {0}")]
    ServiceIndisponible(String),
    #[error("capture cancelled")]
    Annulee,
    #[error("text recognition failed: {0}")]
    Ocr(String),
    #[error("invalid image: {0}")]
    ImageInvalide(String),
}

/* ------------------------ Image ------------------------ */

/// Image en niveaux de gris, une ligne après l’autre.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageGris {
    largeur: usize,
    hauteur: usize,
    pixels: Vec<u8>,
}

impl ImageGris {
    pub fn new(largeur: usize, hauteur: usize, pixels: Vec<u8>) -> Result<Self, ErreurCapture> {
        if largeur == 0 || hauteur == 0 {
            return Err(ErreurCapture::ImageInvalide("empty image".into()));
        }
        if largeur.checked_mul(hauteur) != Some(pixels.len()) {
            return Err(ErreurCapture::ImageInvalide(format!(
                "{} pixels for {largeur}x{hauteur}",
                pixels.len()
            )));
        }
        Ok(Self {
            largeur,
            hauteur,
            pixels,
        })
    }

    pub fn largeur(&self) -> usize {
        self.largeur
    }

    pub fn hauteur(&self) -> usize {
        self.hauteur
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Lit une image PGM binaire (P5, 8 bits).
    pub fn depuis_pgm(octets: &[u8]) -> Result<Self, ErreurCapture> {
        let invalide = |m: &str| ErreurCapture::ImageInvalide(format!("PGM: {m}"));

        // en-tête : "P5" largeur hauteur maxval, séparés par des blancs (# = commentaire)
        let mut champs: Vec<usize> = Vec::with_capacity(3);
        let mut i = 0;
        if octets.get(..2) != Some(b"P5".as_slice()) {
            return Err(invalide("missing P5 magic"));
        }
        i += 2;
        while champs.len() < 3 {
            match octets.get(i) {
                Some(b'#') => {
                    while octets.get(i).is_some_and(|&c| c != b'\n') {
                        i += 1;
                    }
                }
                Some(c) if c.is_ascii_whitespace() => i += 1,
                Some(c) if c.is_ascii_digit() => {
                    let debut = i;
                    while octets.get(i).is_some_and(u8::is_ascii_digit) {
                        i += 1;
                    }
                    let n = std::str::from_utf8(&octets[debut..i])
                        .ok()
                        .and_then(|t| t.parse().ok())
                        .ok_or_else(|| invalide("bad header number"))?;
                    champs.push(n);
                }
                _ => return Err(invalide("truncated header")),
            }
        }
        if champs[2] != 255 {
            return Err(invalide("only 8-bit images (maxval 255)"));
        }
        // un seul blanc entre l’en-tête et les pixels
        if !octets.get(i).is_some_and(u8::is_ascii_whitespace) {
            return Err(invalide("truncated header"));
        }
        i += 1;

        let (largeur, hauteur) = (champs[0], champs[1]);
        let taille = largeur
            .checked_mul(hauteur)
            .ok_or_else(|| invalide("image too large"))?;
        let pixels = i
            .checked_add(taille)
            .and_then(|fin| octets.get(i..fin))
            .ok_or_else(|| invalide("truncated pixel data"))?;
        Self::new(largeur, hauteur, pixels.to_vec())
    }

    /// Écrit l’image en PGM binaire (P5, 8 bits).
    pub fn vers_pgm(&self) -> Vec<u8> {
        let mut octets = format!("P5\n{} {}\n255\n", self.largeur, self.hauteur).into_bytes();
        octets.extend_from_slice(&self.pixels);
        octets
    }

    /// Binarisation inversée : encre (sombre) => 255, fond => 0.
    pub fn binariser_inverse(&self, seuil: u8) -> ImageGris {
        let pixels = self
            .pixels
            .iter()
            .map(|&p| if p > seuil { 0 } else { 255 })
            .collect();
        ImageGris {
            largeur: self.largeur,
            hauteur: self.hauteur,
            pixels,
        }
    }
}

/* ------------------------ Collaborateurs ------------------------ */

/// Moteur OCR : image -> texte brut.
pub trait Ocr {
    fn reconnaitre(&self, image: &ImageGris) -> Result<String, ErreurCapture>;
}

/// Drapeau d’annulation partagé entre l’appelant et la tâche de fond.
#[derive(Clone, Debug, Default)]
pub struct Annulation(Arc<AtomicBool>);

impl Annulation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn annuler(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn est_annulee(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Reconnaissance vocale : écoute (bloquante) -> texte brut.
///
/// L’implémentation doit consulter `annulation` quand elle le peut
/// (ex: entre deux blocs audio) et rendre `ErreurCapture::Annulee`.
pub trait ReconnaissanceVocale: Send + 'static {
    fn ecouter(&mut self, annulation: &Annulation) -> Result<String, ErreurCapture>;
}

impl<R: ReconnaissanceVocale + ?Sized> ReconnaissanceVocale for Box<R> {
    fn ecouter(&mut self, annulation: &Annulation) -> Result<String, ErreurCapture> {
        (**self).ecouter(annulation)
    }
}

/* ------------------------ Pipeline ------------------------ */

/// Texte reconnu -> normalize -> evaluer.
pub fn depuis_texte(brut: &str, options: &Options) -> Evaluation {
    let expression = normalize(brut);
    evaluer(&expression, options)
}

/// Image -> binarisation -> OCR -> pipeline texte.
pub fn depuis_image(
    ocr: &dyn Ocr,
    image: &ImageGris,
    options: &Options,
) -> Result<Evaluation, ErreurCapture> {
    let binaire = image.binariser_inverse(SEUIL_BINARISATION);
    let brut = ocr.reconnaitre(&binaire).map_err(|e| {
        warn!(erreur = %e, "OCR en échec");
        e
    })?;
    debug!(brut = %brut, "texte OCR");
    Ok(depuis_texte(&brut, options))
}

/* ------------------------ Voix en tâche de fond ------------------------ */

/// Écoute vocale lancée sur un thread dédié.
pub struct EcouteVocale {
    annulation: Annulation,
    recepteur: Receiver<Result<String, ErreurCapture>>,
    handle: Option<JoinHandle<()>>,
    recu: bool,
}

impl EcouteVocale {
    /// Démarre l’écoute : `ecouter` est appelé une seule fois, en arrière-plan.
    pub fn lancer<R: ReconnaissanceVocale>(mut reconnaissance: R) -> Self {
        let annulation = Annulation::new();
        let drapeau = annulation.clone();
        let (emetteur, recepteur) = mpsc::channel();

        let handle = std::thread::spawn(move || {
            let resultat = if drapeau.est_annulee() {
                Err(ErreurCapture::Annulee)
            } else {
                match reconnaissance.ecouter(&drapeau) {
                    Ok(_) if drapeau.est_annulee() => Err(ErreurCapture::Annulee),
                    autre => autre,
                }
            };
            // le récepteur a pu être abandonné : rien à faire
            let _ = emetteur.send(resultat);
        });

        info!("écoute vocale lancée");
        Self {
            annulation,
            recepteur,
            handle: Some(handle),
            recu: false,
        }
    }

    pub fn annuler(&self) {
        debug!("écoute vocale annulée");
        self.annulation.annuler();
    }

    /// Non bloquant (boucle d’affichage) : Some une seule fois, quand le texte est prêt.
    pub fn essayer_resultat(&mut self) -> Option<Result<String, ErreurCapture>> {
        if self.recu {
            return None;
        }
        let resultat = match self.recepteur.try_recv() {
            Ok(r) => r,
            Err(TryRecvError::Empty) => return None,
            Err(TryRecvError::Disconnected) => Err(ErreurCapture::ServiceIndisponible(
                "listening task stopped".into(),
            )),
        };
        Some(self.terminer(resultat))
    }

    /// Bloque jusqu’au résultat de l’écoute.
    pub fn attendre(mut self) -> Result<String, ErreurCapture> {
        if self.recu {
            return Err(ErreurCapture::Annulee);
        }
        let resultat = self.recepteur.recv().unwrap_or_else(|_| {
            Err(ErreurCapture::ServiceIndisponible(
                "listening task stopped".into(),
            ))
        });
        self.terminer(resultat)
    }

    /// Bloque puis passe le texte dans le pipeline.
    pub fn evaluer(self, options: &Options) -> Result<Evaluation, ErreurCapture> {
        let brut = self.attendre()?;
        Ok(depuis_texte(&brut, options))
    }

    fn terminer(
        &mut self,
        resultat: Result<String, ErreurCapture>,
    ) -> Result<String, ErreurCapture> {
        self.recu = true;
        if let Some(h) = self.handle.take() {
            let _ = h.join();
        }
        let resultat = match resultat {
            Ok(_) if self.annulation.est_annulee() => Err(ErreurCapture::Annulee),
            autre => autre,
        };
        match &resultat {
            Ok(brut) => debug!(brut = %brut, "texte reconnu (voix)"),
            Err(e) => warn!(erreur = %e, "écoute vocale en échec"),
        }
        resultat
    }
}

impl Drop for EcouteVocale {
    fn drop(&mut self) {
        // écoute abandonnée (fenêtre fermée, nouvelle écoute) : on prévient la tâche
        if !self.recu {
            self.annulation.annuler();
        }
    }
}
