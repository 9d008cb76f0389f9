// src/externe.rs
//
// Collaborateurs par commande externe (natif seulement)
// -----------------------------------------------------
// Un programme de l’hôte fait la reconnaissance et écrit le texte sur stdout :
// - voix : la commande est lancée telle quelle (ex: un script micro + STT)
// - OCR  : l’image binarisée est écrite en PGM, son chemin est ajouté en dernier argument
//
// Code de sortie non nul => service indisponible (voix) ou échec OCR.
// Sortie vide => audio non compris.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread;
use std::time::Duration;

use tracing::debug;

use crate::capture::{Annulation, ErreurCapture, ImageGris, Ocr, ReconnaissanceVocale};

/// Intervalle de sondage du processus (annulation).
const SONDAGE: Duration = Duration::from_millis(20);

/// Programme + arguments, lancé sans shell.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommandeExterne {
    programme: String,
    args: Vec<String>,
}

/// Issue brute d’une exécution.
enum Issue {
    Sortie(String),
    Echec(String),
    Annulee,
}

impl CommandeExterne {
    pub fn new(programme: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            programme: programme.into(),
            args,
        }
    }

    /// "prog arg1 arg2" découpé sur les blancs (pas de guillemets). None si vide.
    pub fn depuis_ligne(ligne: &str) -> Option<Self> {
        let mut mots = ligne.split_whitespace().map(str::to_string);
        let programme = mots.next()?;
        Some(Self::new(programme, mots.collect()))
    }

    fn executer(&self, fichier: Option<&Path>, annulation: &Annulation) -> Issue {
        let mut commande = Command::new(&self.programme);
        commande
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(f) = fichier {
            commande.arg(f);
        }

        let mut enfant = match commande.spawn() {
            Ok(e) => e,
            Err(e) => return Issue::Echec(format!("cannot start '{}': {e}", self.programme)),
        };
        debug!(programme = %self.programme, "commande lancée");

        // stdout/stderr lus à part : un tube plein bloquerait l’enfant
        let sortie = lire_en_fond(enfant.stdout.take());
        let erreurs = lire_en_fond(enfant.stderr.take());

        let statut = loop {
            if annulation.est_annulee() {
                arreter(&mut enfant);
                return Issue::Annulee;
            }
            match enfant.try_wait() {
                Ok(Some(statut)) => break statut,
                Ok(None) => thread::sleep(SONDAGE),
                Err(e) => {
                    arreter(&mut enfant);
                    return Issue::Echec(e.to_string());
                }
            }
        };

        let texte = sortie.join().unwrap_or_default();
        let diagnostic = erreurs.join().unwrap_or_default();
        if statut.success() {
            Issue::Sortie(texte)
        } else {
            let detail = diagnostic.trim();
            Issue::Echec(if detail.is_empty() {
                format!("'{}' exited with {statut}", self.programme)
            } else {
                format!("'{}' exited with {statut}: {detail}", self.programme)
            })
        }
    }
}

fn lire_en_fond<R: Read + Send + 'static>(flux: Option<R>) -> thread::JoinHandle<String> {
    thread::spawn(move || {
        let mut octets = Vec::new();
        if let Some(mut f) = flux {
            let _ = f.read_to_end(&mut octets);
        }
        String::from_utf8_lossy(&octets).into_owned()
    })
}

fn arreter(enfant: &mut Child) {
    let _ = enfant.kill();
    let _ = enfant.wait();
}

impl ReconnaissanceVocale for CommandeExterne {
    fn ecouter(&mut self, annulation: &Annulation) -> Result<String, ErreurCapture> {
        match self.executer(None, annulation) {
            Issue::Sortie(texte) if texte.trim().is_empty() => Err(ErreurCapture::NonCompris),
            Issue::Sortie(texte) => Ok(texte.trim().to_string()),
            Issue::Echec(m) => Err(ErreurCapture::ServiceIndisponible(m)),
            Issue::Annulee => Err(ErreurCapture::Annulee),
        }
    }
}

impl Ocr for CommandeExterne {
    fn reconnaitre(&self, image: &ImageGris) -> Result<String, ErreurCapture> {
        let chemin = FichierTemporaire::ecrire(&image.vers_pgm())?;
        match self.executer(Some(chemin.chemin()), &Annulation::new()) {
            Issue::Sortie(texte) => Ok(texte),
            Issue::Echec(m) => Err(ErreurCapture::Ocr(m)),
            Issue::Annulee => Err(ErreurCapture::Annulee),
        }
    }
}

/// Fichier PGM temporaire, supprimé au drop.
struct FichierTemporaire(PathBuf);

impl FichierTemporaire {
    fn ecrire(octets: &[u8]) -> Result<Self, ErreurCapture> {
        static COMPTEUR: AtomicU64 = AtomicU64::new(0);
        let n = COMPTEUR.fetch_add(1, Ordering::Relaxed);
        let chemin = std::env::temp_dir().join(format!(
            "extracteur_math_{}_{n}.pgm",
            std::process::id()
        ));
        std::fs::write(&chemin, octets)
            .map_err(|e| ErreurCapture::Ocr(format!("cannot write {}: {e}", chemin.display())))?;
        Ok(Self(chemin))
    }

    fn chemin(&self) -> &Path {
        &self.0
    }
}

impl Drop for FichierTemporaire {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.0);
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::capture::{depuis_image, EcouteVocale};
    use crate::noyau::Options;
    use std::time::Instant;

    fn sh(script: &str) -> CommandeExterne {
        CommandeExterne::new("sh", vec!["-c".into(), script.into()])
    }

    #[test]
    fn ligne_decoupee() {
        assert_eq!(
            CommandeExterne::depuis_ligne("  stt --lang en "),
            Some(CommandeExterne::new("stt", vec!["--lang".into(), "en".into()]))
        );
        assert_eq!(CommandeExterne::depuis_ligne("   "), None);
    }

    #[test]
    fn voix_par_commande() {
        let mut voix = sh("echo 5 times 3");
        assert_eq!(voix.ecouter(&Annulation::new()), Ok("5 times 3".into()));

        let mut muette = sh("true");
        assert_eq!(muette.ecouter(&Annulation::new()), Err(ErreurCapture::NonCompris));

        let mut panne = sh("echo offline >&2; exit 3");
        match panne.ecouter(&Annulation::new()) {
            Err(ErreurCapture::ServiceIndisponible(m)) => assert!(m.contains("offline"), "{m}"),
            autre => panic!("{autre:?}"),
        }

        let mut absente = CommandeExterne::new("extracteur-math-commande-absente", vec![]);
        assert!(matches!(
            absente.ecouter(&Annulation::new()),
            Err(ErreurCapture::ServiceIndisponible(_))
        ));
    }

    #[test]
    fn voix_par_commande_annulee() {
        let debut = Instant::now();
        let ecoute = EcouteVocale::lancer(sh("sleep 10; echo trop tard"));
        thread::sleep(Duration::from_millis(50));
        ecoute.annuler();
        assert_eq!(ecoute.attendre(), Err(ErreurCapture::Annulee));
        assert!(debut.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn ocr_recoit_un_pgm() {
        let image = ImageGris::new(2, 1, vec![10, 250]).unwrap();

        // la commande lit l’en-tête du fichier reçu
        let ocr = CommandeExterne::new("head", vec!["-c".into(), "2".into()]);
        assert_eq!(ocr.reconnaitre(&image), Ok("P5".into()));

        let ocr = sh("echo 12 divided by 4");
        let e = depuis_image(&ocr, &image, &Options::default()).unwrap();
        assert_eq!(e.valeur(), Some("3.00000000000000"));

        let ocr = sh("exit 1");
        assert!(matches!(ocr.reconnaitre(&image), Err(ErreurCapture::Ocr(_))));
    }
}
