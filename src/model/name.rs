use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Ether linkage prefix of an acyl/alkyl chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Ether {
    /// Alkyl ether ("O-").
    Plasmanyl,
    /// Alkenyl ether / plasmalogen ("P-").
    Plasmenyl,
}

impl Ether {
    pub fn prefix(&self) -> &'static str {
        match self {
            Ether::Plasmanyl => "O-",
            Ether::Plasmenyl => "P-",
        }
    }
}

/// A single fatty acyl / long-chain base component of a lipid name.
///
/// Rendered canonically as `[O-|P-]<carbons>:<double_bonds>[;O[n]]`.
/// Sphingoid "d"/"t"/"m" prefixes and "(2OH)"-style annotations are
/// normalized into the hydroxyl count on parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Chain {
    pub carbons: u32,
    pub double_bonds: u32,
    pub hydroxyls: u32,
    pub ether: Option<Ether>,
}

impl Chain {
    pub fn new(carbons: u32, double_bonds: u32) -> Self {
        Self {
            carbons,
            double_bonds,
            hydroxyls: 0,
            ether: None,
        }
    }
}

impl fmt::Display for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ether) = self.ether {
            write!(f, "{}", ether.prefix())?;
        }
        write!(f, "{}:{}", self.carbons, self.double_bonds)?;
        match self.hydroxyls {
            0 => Ok(()),
            1 => write!(f, ";O"),
            n => write!(f, ";O{}", n),
        }
    }
}

/// How the chains of a name are joined: "/" when sn-positions are known,
/// "_" when only the molecular composition is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ChainLevel {
    #[default]
    SnPosition,
    Molecular,
}

impl ChainLevel {
    pub fn separator(&self) -> char {
        match self {
            ChainLevel::SnPosition => '/',
            ChainLevel::Molecular => '_',
        }
    }
}

/// A parsed lipid shorthand name: class token plus ordered chains.
///
/// Accepts both the space-delimited shorthand (`PC 16:0/18:1`) and the
/// LIPID MAPS parenthesized form (`PC(16:0/18:1(9Z))`); both normalize to
/// the same canonical rendering. The token sequence used as the embedding
/// corpus unit is the class token followed by the chain tokens in order.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LipidName {
    pub class: String,
    pub chains: Vec<Chain>,
    pub level: ChainLevel,
}

impl LipidName {
    /// The nomenclature token sequence: class token, then one token per chain.
    pub fn tokens(&self) -> Vec<String> {
        let mut tokens = Vec::with_capacity(1 + self.chains.len());
        tokens.push(self.class.clone());
        tokens.extend(self.chains.iter().map(Chain::to_string));
        tokens
    }

    /// Rebuilds a name from a token sequence produced by [`tokens`](Self::tokens).
    pub fn from_tokens(tokens: &[String], level: ChainLevel) -> Result<Self, ParseLipidNameError> {
        let (class, chain_tokens) = tokens
            .split_first()
            .ok_or(ParseLipidNameError::Empty)?;
        let chains = chain_tokens
            .iter()
            .map(|token| parse_chain(token))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            class: class.clone(),
            chains,
            level,
        })
    }
}

impl fmt::Display for LipidName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.class)?;
        for (i, chain) in self.chains.iter().enumerate() {
            if i == 0 {
                write!(f, " {}", chain)?;
            } else {
                write!(f, "{}{}", self.level.separator(), chain)?;
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseLipidNameError {
    #[error("empty lipid name")]
    Empty,

    #[error("invalid chain token '{token}': {details}")]
    InvalidChain { token: String, details: String },

    #[error("mixed chain separators in '{0}'")]
    MixedSeparators(String),

    #[error("unbalanced parentheses in '{0}'")]
    UnbalancedParentheses(String),

    #[error("'{0}' does not follow lipid shorthand notation")]
    NotShorthand(String),
}

impl ParseLipidNameError {
    fn invalid_chain(token: &str, details: impl Into<String>) -> Self {
        Self::InvalidChain {
            token: token.to_string(),
            details: details.into(),
        }
    }
}

impl FromStr for LipidName {
    type Err = ParseLipidNameError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ParseLipidNameError::Empty);
        }

        let (class, chain_list) = split_class_chains(name)?;

        let Some(chain_list) = chain_list else {
            // Class-only name (e.g. "Cholesterol"). A stray chain-like
            // token is not a valid class on its own, and multi-word names
            // without a chain list are trivial names, not shorthand.
            if class.contains(':') || class.contains(char::is_whitespace) {
                return Err(ParseLipidNameError::NotShorthand(name.to_string()));
            }
            return Ok(Self {
                class: class.to_string(),
                chains: Vec::new(),
                level: ChainLevel::default(),
            });
        };

        let (parts, level) = split_chain_list(&chain_list, name)?;
        let chains = parts
            .iter()
            .map(|part| parse_chain(part))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            class: class.to_string(),
            chains,
            level,
        })
    }
}

/// Splits a name into its class prefix and (optional) chain-list segment.
fn split_class_chains(name: &str) -> Result<(String, Option<String>), ParseLipidNameError> {
    // LIPID MAPS form: class immediately followed by a parenthesized
    // chain list, e.g. "PC(16:0/18:1(9Z))".
    if let Some(open) = name.find('(') {
        let class = name[..open].trim();
        let rest = &name[open..];
        if !class.is_empty() && rest.ends_with(')') && rest.contains(':') {
            let inner = &rest[1..rest.len() - 1];
            if !balanced(inner) {
                return Err(ParseLipidNameError::UnbalancedParentheses(name.to_string()));
            }
            return Ok((class.to_string(), Some(inner.to_string())));
        }
    }

    // Space-delimited shorthand: the last whitespace token is the chain
    // list, everything before it is the class.
    match name.rsplit_once(char::is_whitespace) {
        Some((class, last)) if last.contains(':') => Ok((
            class.split_whitespace().collect::<Vec<_>>().join(" "),
            Some(last.to_string()),
        )),
        _ => Ok((name.split_whitespace().collect::<Vec<_>>().join(" "), None)),
    }
}

fn balanced(s: &str) -> bool {
    let mut depth = 0i32;
    for c in s.chars() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth < 0 {
                    return false;
                }
            }
            _ => {}
        }
    }
    depth == 0
}

/// Splits a chain list on "/" or "_" at parenthesis depth zero.
fn split_chain_list(
    list: &str,
    name: &str,
) -> Result<(Vec<String>, ChainLevel), ParseLipidNameError> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut depth = 0i32;
    let mut separator: Option<char> = None;

    for c in list.chars() {
        match c {
            '(' => {
                depth += 1;
                current.push(c);
            }
            ')' => {
                depth -= 1;
                if depth < 0 {
                    return Err(ParseLipidNameError::UnbalancedParentheses(name.to_string()));
                }
                current.push(c);
            }
            '/' | '_' if depth == 0 => {
                match separator {
                    None => separator = Some(c),
                    Some(sep) if sep != c => {
                        return Err(ParseLipidNameError::MixedSeparators(name.to_string()));
                    }
                    Some(_) => {}
                }
                parts.push(std::mem::take(&mut current));
            }
            _ => current.push(c),
        }
    }
    if depth != 0 {
        return Err(ParseLipidNameError::UnbalancedParentheses(name.to_string()));
    }
    parts.push(current);

    let level = match separator {
        Some('_') => ChainLevel::Molecular,
        _ => ChainLevel::SnPosition,
    };
    Ok((parts, level))
}

/// Parses a single chain token, e.g. `16:0`, `O-18:1`, `d18:1`,
/// `18:2(9Z,12Z)`, `24:0(2OH)`, `18:1;O2`.
fn parse_chain(token: &str) -> Result<Chain, ParseLipidNameError> {
    let mut rest = token.trim();
    if rest.is_empty() {
        return Err(ParseLipidNameError::invalid_chain(token, "empty chain"));
    }

    let mut ether = None;
    if let Some(stripped) = rest.strip_prefix("O-") {
        ether = Some(Ether::Plasmanyl);
        rest = stripped;
    } else if let Some(stripped) = rest.strip_prefix("P-") {
        ether = Some(Ether::Plasmenyl);
        rest = stripped;
    }

    // Sphingoid base prefixes carry implicit hydroxyl counts.
    let mut hydroxyls = 0u32;
    let mut chars = rest.chars();
    if let (Some(first), Some(second)) = (chars.next(), chars.next()) {
        if second.is_ascii_digit() {
            match first {
                'm' => {
                    hydroxyls = 1;
                    rest = &rest[1..];
                }
                'd' => {
                    hydroxyls = 2;
                    rest = &rest[1..];
                }
                't' => {
                    hydroxyls = 3;
                    rest = &rest[1..];
                }
                _ => {}
            }
        }
    }

    let (body, annotations) = strip_annotations(rest);
    for annotation in annotations {
        hydroxyls += hydroxyls_in_annotation(&annotation);
    }

    let (head, mods) = match body.split_once(';') {
        Some((head, mods)) => (head, Some(mods)),
        None => (body.as_str(), None),
    };

    let (carbons, double_bonds) = head
        .split_once(':')
        .ok_or_else(|| ParseLipidNameError::invalid_chain(token, "expected '<carbons>:<double bonds>'"))?;
    let carbons: u32 = carbons
        .parse()
        .map_err(|_| ParseLipidNameError::invalid_chain(token, "invalid carbon count"))?;
    let double_bonds: u32 = double_bonds
        .parse()
        .map_err(|_| ParseLipidNameError::invalid_chain(token, "invalid double bond count"))?;

    if let Some(mods) = mods {
        for m in mods.split(';') {
            let m = m.trim();
            if let Some(count) = m.strip_prefix('O') {
                if count.is_empty() {
                    hydroxyls += 1;
                } else {
                    hydroxyls += count.parse::<u32>().map_err(|_| {
                        ParseLipidNameError::invalid_chain(token, "invalid oxygen modification count")
                    })?;
                }
            } else {
                return Err(ParseLipidNameError::invalid_chain(
                    token,
                    format!("unsupported modification '{}'", m),
                ));
            }
        }
    }

    Ok(Chain {
        carbons,
        double_bonds,
        hydroxyls,
        ether,
    })
}

/// Removes parenthesized groups (double bond positions, hydroxyl
/// annotations) from a chain token, returning the bare token and the
/// removed groups.
fn strip_annotations(token: &str) -> (String, Vec<String>) {
    let mut body = String::with_capacity(token.len());
    let mut annotations = Vec::new();
    let mut current = String::new();
    let mut depth = 0i32;

    for c in token.chars() {
        match c {
            '(' => {
                depth += 1;
                if depth > 1 {
                    current.push(c);
                }
            }
            ')' => {
                depth -= 1;
                if depth > 0 {
                    current.push(c);
                } else if depth == 0 {
                    annotations.push(std::mem::take(&mut current));
                }
            }
            _ if depth > 0 => current.push(c),
            _ => body.push(c),
        }
    }

    (body, annotations)
}

/// Counts hydroxyls declared by an annotation: each `OH` part, with or
/// without a position prefix (`2OH`), is one hydroxyl. Double bond
/// position annotations (`9Z,12Z`) contribute nothing.
fn hydroxyls_in_annotation(annotation: &str) -> u32 {
    annotation
        .split(',')
        .filter(|part| {
            let part = part.trim();
            part.strip_suffix("OH")
                .is_some_and(|prefix| prefix.chars().all(|c| c.is_ascii_digit()))
        })
        .count() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(name: &str) -> LipidName {
        name.parse().expect(name)
    }

    #[test]
    fn parses_space_delimited_shorthand() {
        let name = parse("PC 16:0/18:1");
        assert_eq!(name.class, "PC");
        assert_eq!(name.chains, vec![Chain::new(16, 0), Chain::new(18, 1)]);
        assert_eq!(name.level, ChainLevel::SnPosition);
        assert_eq!(name.to_string(), "PC 16:0/18:1");
    }

    #[test]
    fn parses_lipid_maps_parenthesized_form() {
        let name = parse("PC(16:0/18:1(9Z))");
        assert_eq!(name.class, "PC");
        assert_eq!(name.chains, vec![Chain::new(16, 0), Chain::new(18, 1)]);
        assert_eq!(name.to_string(), "PC 16:0/18:1");
    }

    #[test]
    fn parses_molecular_species_separator() {
        let name = parse("TG 16:0_18:1_18:2");
        assert_eq!(name.level, ChainLevel::Molecular);
        assert_eq!(name.chains.len(), 3);
        assert_eq!(name.to_string(), "TG 16:0_18:1_18:2");
    }

    #[test]
    fn parses_ether_chains() {
        let name = parse("PE O-16:1/18:1");
        assert_eq!(name.chains[0].ether, Some(Ether::Plasmanyl));
        assert_eq!(name.to_string(), "PE O-16:1/18:1");

        let name = parse("PC(P-18:0/22:6(4Z,7Z,10Z,13Z,16Z,19Z))");
        assert_eq!(name.chains[0].ether, Some(Ether::Plasmenyl));
        assert_eq!(name.chains[1], Chain::new(22, 6));
    }

    #[test]
    fn normalizes_sphingoid_prefixes() {
        let name = parse("Cer(d18:1/24:0)");
        assert_eq!(name.chains[0].hydroxyls, 2);
        assert_eq!(name.to_string(), "Cer 18:1;O2/24:0");
        assert_eq!(name, parse("Cer 18:1;O2/24:0"));
    }

    #[test]
    fn parses_oxygen_modifications() {
        let name = parse("SM 34:1;O2");
        assert_eq!(name.chains, vec![Chain {
            carbons: 34,
            double_bonds: 1,
            hydroxyls: 2,
            ether: None,
        }]);

        let name = parse("Cer(d18:1/24:0(2OH))");
        assert_eq!(name.chains[1].hydroxyls, 1);
    }

    #[test]
    fn parses_class_only_names() {
        let name = parse("Cholesterol");
        assert!(name.chains.is_empty());
        assert_eq!(name.tokens(), vec!["Cholesterol".to_string()]);
    }

    #[test]
    fn keeps_multi_word_classes() {
        let name = parse("CAR 18:1");
        assert_eq!(name.class, "CAR");

        let name = parse("ST 27:1;O");
        assert_eq!(name.class, "ST");
        assert_eq!(name.chains[0].hydroxyls, 1);
    }

    #[test]
    fn rejects_malformed_names() {
        assert!("".parse::<LipidName>().is_err());
        assert!("   ".parse::<LipidName>().is_err());
        assert!("PC 16:0/18:x".parse::<LipidName>().is_err());
        assert!("PC 16:0_18:1/18:2".parse::<LipidName>().is_err());
        assert!("PC(16:0/18:1".parse::<LipidName>().is_err());
        assert!("16:0".parse::<LipidName>().is_err());
        assert!("cholest-5-en-3beta-ol ester".parse::<LipidName>().is_err());
    }

    #[test]
    fn tokens_are_nonempty_and_rebuild_the_name() {
        for raw in [
            "PC 16:0/18:1",
            "PC(16:0/18:1(9Z))",
            "TG 16:0_18:1_18:2",
            "Cer(d18:1/24:0)",
            "PE O-16:1/18:1",
            "Cholesterol",
        ] {
            let name = parse(raw);
            let tokens = name.tokens();
            assert!(!tokens.is_empty(), "{raw}");
            let rebuilt = LipidName::from_tokens(&tokens, name.level).expect(raw);
            assert_eq!(rebuilt, name, "{raw}");
            assert_eq!(rebuilt.to_string(), name.to_string(), "{raw}");
        }
    }

    #[test]
    fn canonical_rendering_round_trips() {
        for raw in ["PC(16:0/18:1(9Z))", "Cer(d18:1/24:0)", "SM 34:1;O2"] {
            let name = parse(raw);
            assert_eq!(parse(&name.to_string()), name, "{raw}");
        }
    }
}
