//! Stopword removal.
//!
//! Word lists are lowercase. Matching is case-sensitive, so stopword removal
//! is meant to run after lowercasing.

use std::collections::BTreeSet;
use std::fmt;

use fancy_regex::Regex;

use docprep_model::{DocSeries, Result};

use crate::text::basic::remove_accents;
use crate::transform::Transform;
use crate::word_boundary::{self, WordPattern};

/// Bundled stopword selections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StopwordSet {
    /// No bundled words; only explicit additions are removed.
    None,
    /// General French stopwords with their unaccented forms.
    Iso,
    /// Job advertisement boilerplate.
    OffresPe,
    /// Every general-purpose list.
    #[default]
    All,
}

impl StopwordSet {
    /// Parses an option name. Unknown names fall back to [`StopwordSet::All`].
    pub fn from_option(option: &str) -> Self {
        match option {
            "none" => StopwordSet::None,
            "iso" => StopwordSet::Iso,
            "offres_pe" => StopwordSet::OffresPe,
            "all" => StopwordSet::All,
            other => {
                tracing::warn!(
                    option = other,
                    available = "none, iso, offres_pe, all",
                    "unknown stopword option, using all stopwords"
                );
                StopwordSet::All
            }
        }
    }

    pub fn words(self) -> BTreeSet<String> {
        let mut words = BTreeSet::new();
        match self {
            StopwordSet::None => {}
            StopwordSet::Iso | StopwordSet::All => {
                for word in FRENCH_STOPWORDS {
                    words.insert((*word).to_string());
                    words.insert(remove_accents(word));
                }
            }
            StopwordSet::OffresPe => {
                words.extend(JOB_AD_STOPWORDS.iter().map(|word| (*word).to_string()));
            }
        }
        words
    }
}

/// Removes whole-word stopwords from documents.
pub struct StopwordRemover {
    regex: Option<Regex>,
    word_count: usize,
}

impl StopwordRemover {
    /// Builds a remover from a bundled set, plus `add`, minus `remove`.
    ///
    /// # Errors
    ///
    /// Returns [`PrepError::InvalidPattern`](docprep_model::PrepError::InvalidPattern)
    /// if the combined pattern fails to compile.
    pub fn new<A, R>(set: StopwordSet, add: A, remove: R) -> Result<Self>
    where
        A: IntoIterator,
        A::Item: Into<String>,
        R: IntoIterator,
        R::Item: AsRef<str>,
    {
        let mut words = set.words();
        words.extend(add.into_iter().map(Into::into));
        for word in remove {
            words.remove(word.as_ref());
        }
        if words.is_empty() {
            tracing::warn!("stopword list is empty, documents are left unchanged");
            return Ok(Self {
                regex: None,
                word_count: 0,
            });
        }
        let words: Vec<String> = words.into_iter().collect();
        Ok(Self {
            regex: Some(WordPattern::new().build(&words)?),
            word_count: words.len(),
        })
    }

    pub fn word_count(&self) -> usize {
        self.word_count
    }

    /// Removes every stopword of `text`.
    ///
    /// # Errors
    ///
    /// Returns [`PrepError::PatternFailed`](docprep_model::PrepError::PatternFailed)
    /// if matching cannot finish.
    pub fn remove_from(&self, text: &str) -> Result<String> {
        match &self.regex {
            Some(regex) => word_boundary::replace_all(regex, text, ""),
            None => Ok(text.to_string()),
        }
    }
}

impl fmt::Debug for StopwordRemover {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StopwordRemover")
            .field("word_count", &self.word_count)
            .finish_non_exhaustive()
    }
}

impl Transform for StopwordRemover {
    fn name(&self) -> Option<&str> {
        Some("remove_stopwords")
    }

    fn apply(&self, docs: DocSeries) -> Result<DocSeries> {
        if docs.iter().flatten().any(|text| text.chars().any(|c| c.is_ascii_uppercase())) {
            tracing::warn!("some documents contain uppercase letters, stopwords are lowercase only");
        }
        docs.try_map_present(|text| self.remove_from(text))
    }
}


/// French stopwords, lowercase, accented forms included.
pub const FRENCH_STOPWORDS: &[&str] = &[
    "a", "abord", "absolument", "afin", "ah", "ai", "aie", "aient", "aies", "ailleurs", "ainsi",
    "ait", "allaient", "allo", "allons", "allô", "alors", "anterieur", "anterieure",
    "anterieures", "apres", "après", "as", "assez", "attendu", "au", "aucun", "aucune",
    "aucuns", "aujourd", "aujourd'hui", "aupres", "auquel", "aura", "aurai", "auraient",
    "aurais", "aurait", "auras", "aurez", "auriez", "aurions", "aurons", "auront", "aussi",
    "autre", "autrefois", "autrement", "autres", "autrui", "aux", "auxquelles", "auxquels",
    "avaient", "avais", "avait", "avant", "avec", "avez", "aviez", "avions", "avoir", "avons",
    "ayant", "ayez", "ayons", "b", "bah", "bas", "basee", "bat", "beau", "beaucoup", "bien",
    "bigre", "bon", "boum", "bravo", "brrr", "c", "car", "ce", "ceci", "cela", "celle",
    "celle-ci", "celle-là", "celles", "celles-ci", "celles-là", "celui", "celui-ci", "celui-là",
    "celà", "cent", "cependant", "certain", "certaine", "certaines", "certains", "certes",
    "ces", "cet", "cette", "ceux", "ceux-ci", "ceux-là", "chacun", "chacune", "chaque", "cher",
    "chers", "chez", "chiche", "chut", "chère", "chères", "ci", "cinq", "cinquantaine",
    "cinquante", "cinquantième", "cinquième", "clac", "clic", "combien", "comme", "comment",
    "comparable", "comparables", "compris", "concernant", "contre", "couic", "crac", "d", "da",
    "dans", "de", "debout", "dedans", "dehors", "deja", "delà", "depuis", "dernier", "derniere",
    "derriere", "derrière", "des", "desormais", "desquelles", "desquels", "dessous", "dessus",
    "deux", "deuxième", "deuxièmement", "devant", "devers", "devra", "devrait", "different",
    "differentes", "differents", "différent", "différente", "différentes", "différents", "dire",
    "directe", "directement", "dit", "dite", "dits", "divers", "diverse", "diverses", "dix",
    "dix-huit", "dix-neuf", "dix-sept", "dixième", "doit", "doivent", "donc", "dont", "dos",
    "douze", "douzième", "dring", "droite", "du", "duquel", "durant", "dès", "début",
    "désormais", "e", "effet", "egale", "egalement", "egales", "eh", "elle", "elle-même",
    "elles", "elles-mêmes", "en", "encore", "enfin", "entre", "envers", "environ", "es",
    "essai", "est", "et", "etant", "etc", "etre", "eu", "eue", "eues", "euh", "eurent", "eus",
    "eusse", "eussent", "eusses", "eussiez", "eussions", "eut", "eux", "eux-mêmes",
    "exactement", "excepté", "extenso", "exterieur", "eûmes", "eût", "eûtes", "f", "fais",
    "faisaient", "faisant", "fait", "faites", "façon", "feront", "fi", "flac", "floc", "fois",
    "font", "force", "furent", "fus", "fusse", "fussent", "fusses", "fussiez", "fussions",
    "fut", "fûmes", "fût", "fûtes", "g", "gens", "h", "ha", "haut", "hein", "hem", "hep", "hi",
    "ho", "holà", "hop", "hormis", "hors", "hou", "houp", "hue", "hui", "huit", "huitième",
    "hum", "hurrah", "hé", "hélas", "i", "ici", "il", "ils", "importe", "j", "je", "jusqu",
    "jusque", "juste", "k", "l", "la", "laisser", "laquelle", "las", "le", "lequel", "les",
    "lesquelles", "lesquels", "leur", "leurs", "longtemps", "lors", "lorsque", "lui",
    "lui-meme", "lui-même", "là", "lès", "m", "ma", "maint", "maintenant", "mais", "malgre",
    "malgré", "maximale", "me", "meme", "memes", "merci", "mes", "mien", "mienne", "miennes",
    "miens", "mille", "mince", "mine", "minimale", "moi", "moi-meme", "moi-même", "moindres",
    "moins", "mon", "mot", "moyennant", "multiple", "multiples", "même", "mêmes", "n", "na",
    "naturel", "naturelle", "naturelles", "ne", "neanmoins", "necessaire", "necessairement",
    "neuf", "neuvième", "ni", "nombreuses", "nombreux", "nommés", "non", "nos", "notamment",
    "notre", "nous", "nous-mêmes", "nouveau", "nouveaux", "nul", "néanmoins", "nôtre", "nôtres",
    "o", "oh", "ohé", "ollé", "olé", "on", "ont", "onze", "onzième", "ore", "ou", "ouf",
    "ouias", "oust", "ouste", "outre", "ouvert", "ouverte", "ouverts", "où", "p", "paf", "pan",
    "par", "parce", "parfois", "parle", "parlent", "parler", "parmi", "parole", "parseme",
    "partant", "particulier", "particulière", "particulièrement", "pas", "passé", "pendant",
    "pense", "permet", "personne", "personnes", "peu", "peut", "peuvent", "peux", "pff", "pfft",
    "pfut", "pif", "pire", "pièce", "plein", "plouf", "plupart", "plus", "plusieurs", "plutôt",
    "possessif", "possessifs", "possible", "possibles", "pouah", "pour", "pourquoi", "pourrais",
    "pourrait", "pouvait", "prealable", "precisement", "premier", "première", "premièrement",
    "pres", "probable", "probante", "procedant", "proche", "près", "psitt", "pu", "puis",
    "puisque", "pur", "pure", "q", "qu", "quand", "quant", "quant-à-soi", "quanta", "quarante",
    "quatorze", "quatre", "quatre-vingt", "quatrième", "quatrièmement", "que", "quel",
    "quelconque", "quelle", "quelles", "quelqu'un", "quelque", "quelques", "quels", "qui",
    "quiconque", "quinze", "quoi", "quoique", "r", "rare", "rarement", "rares", "relative",
    "relativement", "remarquable", "rend", "rendre", "restant", "reste", "restent",
    "restrictif", "retour", "revoici", "revoilà", "rien", "s", "sa", "sacrebleu", "sait",
    "sans", "sapristi", "sauf", "se", "sein", "seize", "selon", "semblable", "semblaient",
    "semble", "semblent", "sent", "sept", "septième", "sera", "serai", "seraient", "serais",
    "serait", "seras", "serez", "seriez", "serions", "serons", "seront", "ses", "seul", "seule",
    "seulement", "si", "sien", "sienne", "siennes", "siens", "sinon", "six", "sixième", "soi",
    "soi-même", "soient", "sois", "soit", "soixante", "sommes", "son", "sont", "sous",
    "souvent", "soyez", "soyons", "specifique", "specifiques", "speculatif", "stop",
    "strictement", "subtiles", "suffisant", "suffisante", "suffit", "suis", "suit", "suivant",
    "suivante", "suivantes", "suivants", "suivre", "sujet", "superpose", "sur", "surtout", "t",
    "ta", "tac", "tandis", "tant", "tardive", "te", "tel", "telle", "tellement", "telles",
    "tels", "tenant", "tend", "tenir", "tente", "tes", "tic", "tien", "tienne", "tiennes",
    "tiens", "toc", "toi", "toi-même", "ton", "touchant", "toujours", "tous", "tout", "toute",
    "toutefois", "toutes", "treize", "trente", "tres", "trois", "troisième", "troisièmement",
    "trop", "très", "tsoin", "tsouin", "tu", "té", "u", "un", "une", "unes", "uniformement",
    "unique", "uniques", "uns", "v", "va", "vais", "valeur", "vas", "vers", "via", "vif",
    "vifs", "vingt", "vivat", "vive", "vives", "vlan", "voici", "voie", "voient", "voilà",
    "vont", "vos", "votre", "vous", "vous-mêmes", "vu", "vé", "vôtre", "vôtres", "w", "x", "y",
    "z", "zut", "à", "â", "ça", "ès", "étaient", "étais", "était", "étant", "état", "étiez",
    "étions", "été", "étée", "étées", "étés", "êtes", "être", "ô",
];

/// Words that carry no signal in job advertisements.
pub const JOB_AD_STOPWORDS: &[&str] = &[
    "recherche", "recherchons", "mission", "missions", "poste", "recrute", "recrutons",
    "expérience", "assurer", "assurez", "travaux",
];
