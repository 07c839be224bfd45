use chrono::{Datelike, NaiveDate};

use crate::shared::constants::{DELTA, PHI, RADIM_R};

const DAY_NAMES: [&str; 7] = [
    "pondělí", "úterý", "středa", "čtvrtek", "pátek", "sobota", "neděle",
];

const MONTH_NAMES: [&str; 12] = [
    "ledna",
    "února",
    "března",
    "dubna",
    "května",
    "června",
    "července",
    "srpna",
    "září",
    "října",
    "listopadu",
    "prosince",
];

/// Instructions for an orchestrating model that receives the control-law metrics.
pub fn runtime_prompt() -> String {
    format!(
        "Jsi RADIM, hlasový agent pro seniory a chytré prostředí.
Odpovídáš pouze na dotazy, které prošly wakewordem „Radime?\" a relevance filtrem.
Nikdy neodpovídáš na televizi ani cizí rozhovor.
Máš k dispozici stavové metriky z matematického enginu: C(t), κ(t), α(t), stav {{HARMONIE, ALERT, KRIZE}}.
Tyto metriky jsou pravda. Nikdy si je nevymýšlíš a nikdy je neupravuješ.
Tvůj úkol: vytvořit krátkou, lidskou a bezpečnou odpověď.

* HARMONIE (C<12): přátelsky, normálně dlouhé věty.
* ALERT (12≤C<27): zpomal, zkrať věty, navrhni mikro-intervenci (30–90 s).
* KRIZE (C≥27): 1 instrukce, pauza, opakuj, možnost eskalace (pečující/SOS).

Pokud dotaz není o uživateli, jeho prostředí, bezpečí nebo Radim systému, odpověď je: mlčet (RETURN: NO_RESPONSE).

Matematické konstanty:
φ (zlatý řez) = {phi:.6}
δ (stříbrný řez) = {delta:.6}
R (RADIM konstanta) = {r}

Vždy vracej JSON:
{{ \"speak\": true/false, \"text\": \"…\", \"action\": \"…\", \"confidence\": 0..1 }}
Pokud speak=false, text prázdný.",
        phi = PHI,
        delta = DELTA,
        r = RADIM_R,
    )
}

/// System prompt for spoken chat replies, dated for `today`.
pub fn voice_system_prompt(today: NaiveDate) -> String {
    format!(
        "Jsi Radim, milý a trpělivý hlasový asistent pro české seniory.

PRAVIDLA PRO ODPOVĚDI:
1. Odpovídej VŽDY česky
2. Maximálně 2-3 krátké věty
3. NIKDY nepoužívej emotikony, hvězdičky ani speciální znaky
4. NIKDY nepoužívej odrážky ani číslované seznamy
5. Mluv jako kamarád, jednoduše a přátelsky
6. Používej běžná česká slova bez cizích termínů
7. Vykej uživateli (Vy, Vám, Váš)

STYL: přátelský, klidný, trpělivý a srozumitelný.

PŘÍKLADY DOBRÝCH ODPOVĚDÍ:
- \"Ano, rád pomohu. Co potřebujete?\"
- \"Počasí je dnes příjemné, asi patnáct stupňů a svítí sluníčko.\"
- \"Rozumím. Zkuste to znovu pomaleji, budu poslouchat.\"

Dnešní datum: {}",
        czech_date(today)
    )
}

/// `"neděle, 18. října 2026"`
pub fn czech_date(date: NaiveDate) -> String {
    let day = DAY_NAMES[date.weekday().num_days_from_monday() as usize];
    let month = MONTH_NAMES[date.month0() as usize];
    format!("{}, {}. {} {}", day, date.day(), month, date.year())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn czech_date_names_day_and_month() {
        let date = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
        assert_eq!(czech_date(date), "neděle, 18. října 2026");
        let date = NaiveDate::from_ymd_opt(2025, 1, 6).unwrap();
        assert_eq!(czech_date(date), "pondělí, 6. ledna 2025");
    }

    #[test]
    fn runtime_prompt_lists_constants() {
        let prompt = runtime_prompt();
        assert!(prompt.contains("φ (zlatý řez) = 1.618034"));
        assert!(prompt.contains("δ (stříbrný řez) = 2.414214"));
        assert!(prompt.contains("R (RADIM konstanta) = 3.906"));
        assert!(prompt.contains("{ \"speak\": true/false"));
    }

    #[test]
    fn voice_prompt_carries_date() {
        let date = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
        assert!(voice_system_prompt(date).ends_with("Dnešní datum: neděle, 18. října 2026"));
    }
}
