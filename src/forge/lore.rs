//! Deterministic enemy lore
//!
//! Used whenever the generative backend is unavailable or its reply can't
//! be parsed. Text is assembled from fixed tables keyed by domain,
//! archetype and age, with the note's own details spliced in. The only
//! randomness is variant choice through the caller's seeded rng.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::analysis::{Archetype, Domain, Features};
use crate::vault::difficulty::AgeDescriptor;
use crate::vault::note::truncate_chars;

pub const NARRATIVE_MIN_CHARS: usize = 200;
pub const NARRATIVE_MAX_CHARS: usize = 480;
/// Titles are cut to this length inside names
const TITLE_CHARS_IN_NAMES: usize = 40;
const KEY_PHRASE_CHARS: usize = 50;
const DEFAULT_PAD: &str = "Somewhere in the dark, a page turns by itself.";

struct DomainLore {
    creatures: &'static [&'static str],
    description: &'static str,
    weapons: &'static [&'static str],
    armors: &'static [&'static str],
    environment: &'static str,
    opening: &'static str,
    numbers: &'static str,
    phrase: &'static str,
    closing: &'static str,
    taunt: &'static str,
}

fn domain_lore(domain: Domain) -> &'static DomainLore {
    match domain {
        Domain::Secrets => &SECRETS,
        Domain::Technical => &TECHNICAL,
        Domain::Finance => &FINANCE,
        Domain::Business => &BUSINESS,
        Domain::Health => &HEALTH,
        Domain::Culinary => &CULINARY,
        Domain::Learning => &LEARNING,
        Domain::Travel => &TRAVEL,
        Domain::Creative => &CREATIVE,
        Domain::Personal => &PERSONAL,
        Domain::Errands => &ERRANDS,
        Domain::General => &GENERAL,
    }
}

static SECRETS: DomainLore = DomainLore {
    creatures: &["Gatekeeper", "Cipher Wraith", "Keeper of Hidden Keys"],
    description: "A hooded figure stitched from redacted ink, keys rattling at its belt.",
    weapons: &["Cryptographic Key of Forbidden Access", "Dagger of Salted Hashes"],
    armors: &["Cloak of Redaction", "Vault-Door Breastplate"],
    environment: "Sealed Archive of {title}",
    opening: "You descend into the Sealed Archive, where every word of '{title}' hides behind a lock.",
    numbers: "Exactly {n} locks glow along the walls, each humming a different combination.",
    phrase: "A whisper leaks through the keyhole: '{phrase}...'",
    closing: "Shadows fold over the shelves as the guardian rises to protect what was never meant to be read.",
    taunt: "You will never learn what '{item}' hides!",
};

static TECHNICAL: DomainLore = DomainLore {
    creatures: &["Digital Scribe", "Binary Revenant", "Daemon of Compiled Logic"],
    description: "A mystical programmer, its fingers weaving glowing runes of compiled knowledge.",
    weapons: &["Binary Blade of Compiled Logic", "Ethernet Lash of Digital Pain"],
    armors: &["Chainmail of Error Handling", "Firewall Robes of Packet Protection"],
    environment: "Digital Realm of Living Code",
    opening: "You enter the Sacred Algorithm Sanctum, where the knowledge of '{title}' has crystallized into living code.",
    numbers: "The air crackles with {n} patterns of mystical energy, each a layer of understanding.",
    phrase: "Glowing runes spell out the eternal truth: '{phrase}...'",
    closing: "Data streams flow like luminous rivers while spectral frameworks stand sentinel over the accumulated wisdom.",
    taunt: "Your stack trace ends at '{item}'!",
};

static FINANCE: DomainLore = DomainLore {
    creatures: &["Coinkeeper", "Ledger Ghoul", "Auditor of Debts"],
    description: "A gaunt clerk of tarnished coins, its ledger dripping red ink.",
    weapons: &["Abacus Flail of Compound Interest", "Quill of Overdue Notices"],
    armors: &["Gilded Ledger Plate", "Vest of Balanced Books"],
    environment: "Counting House of {title}",
    opening: "You step into the Counting House, where the sums of '{title}' rattle like coins in an endless drawer.",
    numbers: "A tally of {n} glows on the wall, refusing to balance.",
    phrase: "The ledger reads aloud: '{phrase}...'",
    closing: "Stacks of coins topple and reform as the keeper of accounts turns its hollow gaze upon you.",
    taunt: "'{item}' is still unpaid!",
};

static BUSINESS: DomainLore = DomainLore {
    creatures: &["Echo of the Assembly", "Agenda Specter", "Deadline Fiend"],
    description: "A suited specter endlessly scribbling notes, its hollow eyes reflecting corporate tedium.",
    weapons: &["Bureaucratic Gavel of Endless Meetings", "Spear of Shifting Deadlines"],
    armors: &["Corporate Suit of Bureaucratic Defense", "Shield of Action Items"],
    environment: "Ethereal Conference Chamber",
    opening: "You find yourself in the Ethereal Conference Dimension, where echoes of '{title}' still reverberate through spacetime.",
    numbers: "The phantom agenda lists {n} items that will never be completed.",
    phrase: "Ghostly voices discuss: '{phrase}...'",
    closing: "Corporate spirits gather around a table that exists in all timelines at once, their deliberations shaping reality itself.",
    taunt: "'{item}' was due yesterday!",
};

static HEALTH: DomainLore = DomainLore {
    creatures: &["Vitality Warden", "Fever Shade", "Warden of the Pulse"],
    description: "A pale physician whose lantern beats in time with a heart that is not its own.",
    weapons: &["Scalpel of Second Opinions", "Staff of Measured Doses"],
    armors: &["Bandage Mail of Recovery", "Apron of the Long Ward"],
    environment: "Whispering Infirmary of {title}",
    opening: "You enter the Whispering Infirmary, where the records of '{title}' drift between empty beds.",
    numbers: "A chart on the wall counts {n} beats before falling silent.",
    phrase: "The patient file murmurs: '{phrase}...'",
    closing: "Lanterns flicker with a slow pulse as the warden of this place rises to check on its newest arrival.",
    taunt: "You skipped '{item}', didn't you?",
};

static CULINARY: DomainLore = DomainLore {
    creatures: &["Culinary Phantom", "Pantry Wraith", "Spectral Chef"],
    description: "A chef-like demon wreathed in aromatic smoke, wielding kitchen implements as weapons.",
    weapons: &["Flaming Spatula of Culinary Wrath", "Cleaver of Forgotten Recipes"],
    armors: &["Apron of Culinary Mastery", "Cast-Iron Cuirass"],
    environment: "Spectral Kitchen of Lost Recipes",
    opening: "You enter the Mystical Culinary Chamber, where the essence of '{title}' has manifested as living cuisine.",
    numbers: "The sacred recipe calls for {n} mystical components, each floating in shimmering suspension.",
    phrase: "The air whispers ancient culinary secrets: '{phrase}...'",
    closing: "Spectral ingredients dance through the air while phantom aromas awaken a primordial hunger in your soul.",
    taunt: "You forgot the {item}!",
};

static LEARNING: DomainLore = DomainLore {
    creatures: &["Proctor of Lost Lessons", "Margin Wraith", "Examiner"],
    description: "A robed scholar with ink-stained fingers, pages of half-read chapters orbiting its head.",
    weapons: &["Red Pen of Failing Grades", "Tome of Unanswered Questions"],
    armors: &["Robes of Perpetual Study", "Bookbinding Bracers"],
    environment: "Scholar's Archive of {title}",
    opening: "You wander into the Scholar's Archive, where the lessons of '{title}' hang half-learned in the dusty air.",
    numbers: "Chapter {n} lies open on a lectern, its pages turning on their own.",
    phrase: "A chalkboard scrawls: '{phrase}...'",
    closing: "Lamps gutter over empty desks as the examiner steps forward with a question you should know the answer to.",
    taunt: "Define '{item}'. Now!",
};

static TRAVEL: DomainLore = DomainLore {
    creatures: &["Wandering Spirit", "Roadside Revenant", "Ferryman of Missed Connections"],
    description: "A restless wanderer with a map of ethereal destinations, forever planning journeys never taken.",
    weapons: &["Compass Blade of Wandering Paths", "Boarding-Pass Shuriken"],
    armors: &["Traveler's Cloak of Endless Journeys", "Passport-Stamp Pauldrons"],
    environment: "Crossroads of {title}",
    opening: "You arrive at a fog-bound crossroads, where the plans of '{title}' are carved into every signpost.",
    numbers: "The departure board flickers through {n} destinations that no longer exist.",
    phrase: "A faded itinerary flutters past: '{phrase}...'",
    closing: "Footsteps echo down roads that lead nowhere as the spirit of the journey bars your way.",
    taunt: "You never made it to {item}!",
};

static CREATIVE: DomainLore = DomainLore {
    creatures: &["Muse of Unfinished Drafts", "Ink Chimera", "Storyweaver"],
    description: "A shifting figure of crossed-out sentences, forever rewriting its own outline.",
    weapons: &["Quill of Rejected Drafts", "Brush of Unfinished Strokes"],
    armors: &["Parchment Scale of Revisions", "Cloak of Margin Notes"],
    environment: "Gallery of {title}",
    opening: "You step onto an unfinished canvas, where the ideas of '{title}' bleed into one another like wet paint.",
    numbers: "{n} half-written verses float in the air, waiting for an ending.",
    phrase: "A line of ink writes itself across the sky: '{phrase}...'",
    closing: "Colors swirl and sketches come to life as the muse demands to know why you abandoned it.",
    taunt: "You never finished '{item}'!",
};

static PERSONAL: DomainLore = DomainLore {
    creatures: &["Oneiric Guardian", "Memory Wraith", "Keeper of the Diary"],
    description: "A translucent figure wrapped in faded photographs and pressed flowers.",
    weapons: &["Locket Flail of Old Regrets", "Dreamcatcher Whip"],
    armors: &["Quilt of Remembered Days", "Veil of Quiet Hours"],
    environment: "Hall of Memory Fragments",
    opening: "You drift into the Hall of Memory Fragments, where the pages of '{title}' glow like embers of a fading dream.",
    numbers: "{n} candles burn on the mantle, one for every night you meant to write.",
    phrase: "A familiar voice reads aloud: '{phrase}...'",
    closing: "Half-remembered rooms fold into one another as the guardian of these memories turns to face you.",
    taunt: "Do you even remember '{item}'?",
};

static ERRANDS: DomainLore = DomainLore {
    creatures: &["Merchant Wraith", "Errand Golem", "Hoarder of Lists"],
    description: "A hunched peddler buried under crumpled receipts, muttering an endless list.",
    weapons: &["Shopping-Cart Battering Ram", "Receipt Scroll of Endless Desires"],
    armors: &["Tote-Bag Brigandine", "Coupon-Scale Mail"],
    environment: "Merchant's Eternal Bazaar",
    opening: "You push through the Eternal Bazaar, where the list of '{title}' is nailed to every stall.",
    numbers: "A ghostly cart rattles past carrying {n} items nobody remembered to buy.",
    phrase: "The crumpled list reads: '{phrase}...'",
    closing: "Stalls rearrange themselves behind you as the keeper of chores blocks the only exit.",
    taunt: "You still haven't picked up the {item}!",
};

static GENERAL: DomainLore = DomainLore {
    creatures: &["Essence", "Spirit", "Echo", "Phantom", "Keeper"],
    description: "A mysterious entity born from forgotten words, guarding its secrets fiercely.",
    weapons: &["Ethereal Blade of Forgotten Lore", "Staff of Dim Recollection"],
    armors: &["Mystical Vestments of Dust", "Robes of Faded Ink"],
    environment: "Mystical Sanctuary of {title}",
    opening: "You discover the Sanctum of Eternal Knowledge, where the essence of '{title}' has achieved mystical consciousness.",
    numbers: "The sacred text contains {n} fundamental truths that shape this reality.",
    phrase: "Ancient wisdom speaks: '{phrase}...'",
    closing: "Reality bends and flows around you as pure knowledge takes physical form, challenging any who dare approach.",
    taunt: "'{item}' belongs to me now!",
};

fn archetype_phrases(archetype: Archetype) -> &'static [&'static str] {
    match archetype {
        Archetype::Sentinel => &[
            "None shall pass these seals!",
            "I have guarded this longer than you have remembered it!",
            "Your credentials are invalid!",
        ],
        Archetype::Artificer => &[
            "I will refactor you out of existence!",
            "Your logic has a fatal flaw!",
            "Compiling your defeat...",
        ],
        Archetype::Sage => &[
            "You understand nothing of the underlying principle!",
            "Theory without practice is your undoing!",
            "Ponder this, mortal!",
        ],
        Archetype::Mourner => &[
            "Feel what you left behind!",
            "You buried these feelings, but they did not stay buried!",
            "Every forgotten word is a wound!",
        ],
        Archetype::Weaver => &[
            "Every thread leads back to me!",
            "You can't unlink what I have bound!",
            "Follow the link... to your doom!",
        ],
        Archetype::Hoarder => &[
            "Item one: your defeat!",
            "I keep everything, and now I keep you!",
            "Check it off, if you can!",
        ],
        Archetype::Wanderer => &[
            "Your understanding means nothing to me!",
            "You forgot me, but I did not forget you!",
            "Knowledge unclaimed becomes knowledge untamed!",
        ],
    }
}

fn age_phrase(age: AgeDescriptor) -> &'static str {
    match age {
        AgeDescriptor::Fresh => "I was only just written, and already you come to erase me!",
        AgeDescriptor::Seasoned => "Weeks of neglect have made me strong!",
        AgeDescriptor::Weathered => "Months in the dark have sharpened my edges!",
        AgeDescriptor::Ancient => "I have waited countless seasons for this!",
    }
}

/// Generated or fallback lore for one enemy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lore {
    pub name: String,
    pub description: String,
    pub backstory: String,
    pub weapon: String,
    pub armor: String,
    pub environment: String,
    pub narrative: String,
    pub phrases: Vec<String>,
    pub defeat: String,
    pub victory: String,
}

/// What the lore tables are keyed and spliced on
pub struct LoreContext<'a> {
    pub title: &'a str,
    pub features: &'a Features,
    pub age: AgeDescriptor,
}

impl LoreContext<'_> {
    fn short_title(&self) -> String {
        truncate_chars(self.title.trim(), TITLE_CHARS_IN_NAMES)
    }

    /// Pads used to bring a narrative up to the minimum band length
    pub fn narrative_pads(&self) -> Vec<String> {
        let archetype = self.features.archetype;
        vec![
            format!(
                "The {} of this place {}.",
                archetype.title().to_lowercase(),
                archetype.demeanor()
            ),
            format!(
                "Dust marks {} since anyone last read these words.",
                self.age.span()
            ),
            format!("The realm of {} stirs, sensing an intruder.", self.features.domain.realm()),
            DEFAULT_PAD.to_string(),
        ]
    }
}

pub fn fallback_lore<R: Rng>(ctx: &LoreContext<'_>, rng: &mut R) -> Lore {
    let table = domain_lore(ctx.features.domain);
    let details = &ctx.features.details;
    let title = ctx.short_title();
    let archetype = ctx.features.archetype;

    let creature = pick(table.creatures, rng);
    let name = format!("{} {} of {}", ctx.age.adjective(), creature, title);

    let description = format!("{} It {}.", table.description, archetype.demeanor());

    let mut backstory = format!(
        "Born from {} of neglect in the {}, this {} guards what remains of '{}'.",
        ctx.age.span(),
        ctx.features.domain.realm(),
        archetype.title().to_lowercase(),
        title
    );
    if let Some(line) = &details.first_line {
        backstory.push_str(&format!(
            " It still whispers the words '{}'.",
            truncate_chars(line, KEY_PHRASE_CHARS)
        ));
    }

    let mut narrative = table.opening.replace("{title}", &title);
    if let Some(n) = details.numbers.first() {
        narrative.push(' ');
        narrative.push_str(&table.numbers.replace("{n}", &n.to_string()));
    }
    if let Some(line) = &details.first_line {
        narrative.push(' ');
        narrative.push_str(
            &table
                .phrase
                .replace("{phrase}", &truncate_chars(line, KEY_PHRASE_CHARS)),
        );
    }
    if let Some(item) = details.list_items.first() {
        narrative.push_str(&format!(
            " Spectral voices chant '{}' over and over.",
            truncate_chars(item, KEY_PHRASE_CHARS)
        ));
    }
    narrative.push(' ');
    narrative.push_str(table.closing);

    let mut phrases = vec![age_phrase(ctx.age).to_string()];
    phrases.extend(
        archetype_phrases(archetype)
            .choose_multiple(rng, 2)
            .map(|p| p.to_string()),
    );
    let splice = details
        .list_items
        .first()
        .or(details.headers.first())
        .or(details.bold.first());
    if let Some(item) = splice {
        phrases.push(
            table
                .taunt
                .replace("{item}", &truncate_chars(item, KEY_PHRASE_CHARS)),
        );
    }

    Lore {
        description,
        backstory,
        weapon: pick(table.weapons, rng).to_string(),
        armor: pick(table.armors, rng).to_string(),
        environment: table.environment.replace("{title}", &title),
        narrative: fit_to_band(&narrative, &ctx.narrative_pads()),
        phrases,
        defeat: format!("The secrets of {}... are yours to claim...", title),
        victory: format!("'{}' remains unread, and so shall you.", title),
        name,
    }
}

fn pick<R: Rng>(options: &'static [&'static str], rng: &mut R) -> &'static str {
    options.choose(rng).copied().unwrap_or("Wraith")
}

/// Pad or trim text into the narrative length band
pub fn fit_to_band(text: &str, pads: &[String]) -> String {
    let mut out = text.split_whitespace().collect::<Vec<_>>().join(" ");

    let mut i = 0;
    while out.chars().count() < NARRATIVE_MIN_CHARS {
        let pad = pads
            .get(i % pads.len().max(1))
            .map(|p| p.trim())
            .filter(|p| !p.is_empty())
            .unwrap_or(DEFAULT_PAD);
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(pad);
        i += 1;
    }

    if out.chars().count() <= NARRATIVE_MAX_CHARS {
        return out;
    }
    trim_to_band(&out)
}

fn trim_to_band(text: &str) -> String {
    let head = truncate_chars(text, NARRATIVE_MAX_CHARS);
    if let Some(pos) = head.rfind(['.', '!', '?']) {
        let cut = &head[..=pos];
        if cut.chars().count() >= NARRATIVE_MIN_CHARS {
            return cut.to_string();
        }
    }

    let head = truncate_chars(text, NARRATIVE_MAX_CHARS - 3);
    let cut = head
        .rfind(char::is_whitespace)
        .map(|pos| head[..pos].trim_end())
        .filter(|c| c.chars().count() >= NARRATIVE_MIN_CHARS)
        .unwrap_or(head.as_str());
    format!("{}...", cut)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::ContentAnalyzer;
    use crate::vault::NoteRef;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn lore_for(title: &str, content: &str, age: AgeDescriptor, seed: u64) -> Lore {
        let features = ContentAnalyzer::new().analyze(&NoteRef::new(title, content));
        let ctx = LoreContext {
            title,
            features: &features,
            age,
        };
        fallback_lore(&ctx, &mut ChaCha8Rng::seed_from_u64(seed))
    }

    #[test]
    fn test_details_are_spliced_in() {
        let lore = lore_for(
            "Pancakes",
            "Whisk 3 eggs into the flour slowly.\n- buttermilk\n- maple syrup\n",
            AgeDescriptor::Weathered,
            1,
        );
        assert!(lore.name.starts_with("Dust-Veiled "));
        assert!(lore.name.ends_with(" of Pancakes"));
        assert!(lore.narrative.contains("3 mystical components"));
        assert!(lore.narrative.contains("Whisk 3 eggs"));
        assert!(lore.phrases.iter().any(|p| p.contains("buttermilk")));
        assert!(lore.backstory.contains("long months"));
    }

    #[test]
    fn test_same_seed_same_lore() {
        let a = lore_for("API notes", "The api framework", AgeDescriptor::Fresh, 9);
        let b = lore_for("API notes", "The api framework", AgeDescriptor::Fresh, 9);
        assert_eq!(a, b);
    }

    #[test]
    fn test_narrative_always_in_band() {
        let lore = lore_for("x", "", AgeDescriptor::Ancient, 3);
        let len = lore.narrative.chars().count();
        assert!((NARRATIVE_MIN_CHARS..=NARRATIVE_MAX_CHARS).contains(&len));
    }

    #[test]
    fn test_long_title_is_shortened_in_name() {
        let title = "t".repeat(200);
        let lore = lore_for(&title, "words", AgeDescriptor::Fresh, 0);
        assert!(lore.name.chars().count() < 100);
    }

    #[test]
    fn test_trim_prefers_sentence_end() {
        let text = "A short sentence here. ".repeat(40);
        let fitted = fit_to_band(&text, &[]);
        assert!(fitted.ends_with('.'));
        assert!(fitted.chars().count() <= NARRATIVE_MAX_CHARS);
    }

    proptest! {
        #[test]
        fn prop_fit_to_band_length(text in "\\PC{0,1200}") {
            let fitted = fit_to_band(&text, &["pad one.".to_string()]);
            let len = fitted.chars().count();
            prop_assert!((NARRATIVE_MIN_CHARS..=NARRATIVE_MAX_CHARS).contains(&len));
        }
    }
}
