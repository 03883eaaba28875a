use std::io::{self, BufRead};
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use mailprobe_lib::VerifyOptions;

#[derive(Parser)]
#[command(name = "mailprobe-cli", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Commands,

    /// fichier de configuration TOML
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// format: human|json|ndjson|csv
    #[arg(long, global = true, default_value = "human")]
    pub format: String,

    /// écrit le rapport dans un fichier (écriture atomique)
    #[arg(long, global = true)]
    pub out: Option<PathBuf>,

    /// désactive la sonde SMTP (aucune connexion au port 25)
    #[arg(long, global = true)]
    pub no_smtp: bool,

    /// logs détaillés sur stderr (RUST_LOG reste prioritaire)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// vérifie une ou plusieurs adresses
    Verify {
        #[command(flatten)]
        input: InputArgs,
        #[command(flatten)]
        options: OptionArgs,
    },
    /// vérification par lots avec concurrence bornée (résultats dans l'ordre)
    Batch {
        #[command(flatten)]
        input: InputArgs,
        #[command(flatten)]
        options: OptionArgs,
        /// vérifications simultanées (défaut: configuration)
        #[arg(long, short = 'c')]
        concurrency: Option<usize>,
    },
    /// note la configuration DNS d'envoi d'un domaine
    Deliverability {
        /// domaine (ou adresse) à analyser
        domain: String,
    },
    /// détecte si le serveur MX accepte n'importe quel destinataire
    #[command(name = "catch-all")]
    CatchAll {
        /// domaine (ou adresse) à sonder
        domain: String,
    },
    /// santé d'une petite liste (10 à 50 adresses)
    #[command(name = "list-health")]
    ListHealth {
        #[command(flatten)]
        input: InputArgs,
        #[command(flatten)]
        options: OptionArgs,
    },
    /// job de vérification suivi (dédoublonnage, progression, statistiques)
    Job {
        #[command(flatten)]
        input: InputArgs,
        #[command(flatten)]
        options: OptionArgs,
        #[arg(long, short = 'c')]
        concurrency: Option<usize>,
        /// affiche la progression sur stderr
        #[arg(long)]
        progress: bool,
    },
}

#[derive(Args)]
pub struct InputArgs {
    /// adresses e-mail
    pub emails: Vec<String>,

    /// lit des adresses depuis stdin (une par ligne)
    #[arg(long)]
    pub stdin: bool,
}

impl InputArgs {
    /// Arguments puis stdin; lignes vides et commentaires `#` ignorés.
    pub fn collect(&self) -> Result<Vec<String>> {
        let mut emails = self.emails.clone();
        if self.stdin {
            for line in io::stdin().lock().lines() {
                let line = line.context("read stdin")?;
                let line = line.trim();
                if !line.is_empty() && !line.starts_with('#') {
                    emails.push(line.to_string());
                }
            }
        }
        if emails.is_empty() {
            bail!("aucune adresse: passez-les en argument ou via --stdin");
        }
        Ok(emails)
    }
}

#[derive(Args)]
pub struct OptionArgs {
    /// ne signale pas les domaines jetables
    #[arg(long)]
    pub skip_disposable: bool,

    /// ne signale pas les adresses de rôle (admin@, support@…)
    #[arg(long)]
    pub skip_role: bool,

    /// pas de suggestion de domaine
    #[arg(long)]
    pub skip_typo: bool,
}

impl Cli {
    pub fn parse_args() -> Self {
        <Self as Parser>::parse()
    }
}

impl OptionArgs {
    pub fn to_options(&self) -> VerifyOptions {
        VerifyOptions {
            skip_disposable: self.skip_disposable,
            skip_role: self.skip_role,
            skip_typo: self.skip_typo,
        }
    }
}
