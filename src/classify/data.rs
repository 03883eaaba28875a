//! Static classification tables.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use phf::{phf_map, phf_set};

/// Bundled disposable-domain list, one domain per line.
const DISPOSABLE_LIST: &str = include_str!("disposable_domains.txt");

pub(crate) static DISPOSABLE_DOMAINS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    DISPOSABLE_LIST
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .collect()
});

/// Operator names for the best-known disposable services.
pub(crate) static DISPOSABLE_PROVIDERS: phf::Map<&'static str, &'static str> = phf_map! {
    "10minutemail.com" => "10 Minute Mail",
    "10minutemail.net" => "10 Minute Mail",
    "10minutemail.co.uk" => "10 Minute Mail",
    "10minutemail.de" => "10 Minute Mail",
    "burnermail.io" => "Burner Mail",
    "discard.email" => "Discard.Email",
    "dispostable.com" => "Dispostable",
    "dropmail.me" => "DropMail",
    "emailondeck.com" => "EmailOnDeck",
    "getnada.com" => "Nada",
    "nada.email" => "Nada",
    "guerrillamail.biz" => "Guerrilla Mail",
    "guerrillamail.com" => "Guerrilla Mail",
    "guerrillamail.de" => "Guerrilla Mail",
    "guerrillamail.info" => "Guerrilla Mail",
    "guerrillamail.net" => "Guerrilla Mail",
    "guerrillamail.org" => "Guerrilla Mail",
    "guerrillamailblock.com" => "Guerrilla Mail",
    "sharklasers.com" => "Guerrilla Mail",
    "jetable.org" => "Jetable",
    "mail.tm" => "Mail.tm",
    "maildrop.cc" => "Maildrop",
    "mailinator.com" => "Mailinator",
    "mailinator.net" => "Mailinator",
    "mailinator.org" => "Mailinator",
    "mailinator2.com" => "Mailinator",
    "mailsac.com" => "Mailsac",
    "mohmal.com" => "Mohmal",
    "spamgourmet.com" => "Spamgourmet",
    "temp-mail.io" => "Temp Mail",
    "temp-mail.org" => "Temp Mail",
    "tempmail.plus" => "TempMail Plus",
    "throwawaymail.com" => "ThrowAwayMail",
    "trashmail.com" => "TrashMail",
    "trashmail.de" => "TrashMail",
    "trashmail.net" => "TrashMail",
    "yopmail.com" => "YOPmail",
    "yopmail.fr" => "YOPmail",
    "yopmail.net" => "YOPmail",
};

pub(crate) static ROLE_LOCAL_PARTS: phf::Set<&'static str> = phf_set! {
    "abuse", "accounting", "accounts", "admin", "administrator", "billing",
    "careers", "compliance", "contact", "customerservice", "dev", "devnull",
    "enquiries", "feedback", "finance", "help", "helpdesk", "hello", "hostmaster",
    "hr", "info", "inquiries", "it", "jobs", "legal", "list", "mail", "mailer-daemon",
    "marketing", "media", "newsletter", "no-reply", "noc", "noreply", "office",
    "operations", "orders", "postmaster", "press", "privacy", "purchasing",
    "recruitment", "root", "sales", "security", "service", "services", "spam",
    "staff", "support", "sysadmin", "team", "tech", "webmaster",
};

/// Consumer webmail domains mapped to their operator.
pub(crate) static FREE_PROVIDERS: phf::Map<&'static str, &'static str> = phf_map! {
    "gmail.com" => "Google",
    "googlemail.com" => "Google",
    "yahoo.com" => "Yahoo",
    "yahoo.fr" => "Yahoo",
    "yahoo.co.uk" => "Yahoo",
    "ymail.com" => "Yahoo",
    "rocketmail.com" => "Yahoo",
    "hotmail.com" => "Microsoft",
    "hotmail.fr" => "Microsoft",
    "hotmail.co.uk" => "Microsoft",
    "outlook.com" => "Microsoft",
    "outlook.fr" => "Microsoft",
    "live.com" => "Microsoft",
    "live.fr" => "Microsoft",
    "msn.com" => "Microsoft",
    "icloud.com" => "Apple",
    "me.com" => "Apple",
    "mac.com" => "Apple",
    "aol.com" => "AOL",
    "protonmail.com" => "Proton",
    "proton.me" => "Proton",
    "pm.me" => "Proton",
    "gmx.com" => "GMX",
    "gmx.de" => "GMX",
    "gmx.net" => "GMX",
    "web.de" => "WEB.DE",
    "mail.com" => "Mail.com",
    "yandex.com" => "Yandex",
    "yandex.ru" => "Yandex",
    "mail.ru" => "Mail.ru",
    "zoho.com" => "Zoho",
    "tutanota.com" => "Tutanota",
    "fastmail.com" => "Fastmail",
    "orange.fr" => "Orange",
    "free.fr" => "Free",
    "laposte.net" => "La Poste",
    "sfr.fr" => "SFR",
    "comcast.net" => "Comcast",
    "qq.com" => "Tencent",
    "163.com" => "NetEase",
};
