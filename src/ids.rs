//! Catalog identifiers: ordinal index <-> PokeAPI id <-> display code

/// Number of entries in the catalog (the original Kanto dex).
pub const CATALOG_SIZE: usize = 151;

pub const FIRST_151: [&str; CATALOG_SIZE] = [
    "Bulbasaur", "Ivysaur", "Venusaur", "Charmander", "Charmeleon", "Charizard", "Squirtle",
    "Wartortle", "Blastoise", "Caterpie", "Metapod", "Butterfree", "Weedle", "Kakuna", "Beedrill",
    "Pidgey", "Pidgeotto", "Pidgeot", "Rattata", "Raticate", "Spearow", "Fearow", "Ekans", "Arbok",
    "Pikachu", "Raichu", "Sandshrew", "Sandslash", "Nidoran♀", "Nidorina", "Nidoqueen", "Nidoran♂",
    "Nidorino", "Nidoking", "Clefairy", "Clefable", "Vulpix", "Ninetales", "Jigglypuff",
    "Wigglytuff", "Zubat", "Golbat", "Oddish", "Gloom", "Vileplume", "Paras", "Parasect", "Venonat",
    "Venomoth", "Diglett", "Dugtrio", "Meowth", "Persian", "Psyduck", "Golduck", "Mankey",
    "Primeape", "Growlithe", "Arcanine", "Poliwag", "Poliwhirl", "Poliwrath", "Abra", "Kadabra",
    "Alakazam", "Machop", "Machoke", "Machamp", "Bellsprout", "Weepinbell", "Victreebel",
    "Tentacool", "Tentacruel", "Geodude", "Graveler", "Golem", "Ponyta", "Rapidash", "Slowpoke",
    "Slowbro", "Magnemite", "Magneton", "Farfetch'd", "Doduo", "Dodrio", "Seel", "Dewgong",
    "Grimer", "Muk", "Shellder", "Cloyster", "Gastly", "Haunter", "Gengar", "Onix", "Drowzee",
    "Hypno", "Krabby", "Kingler", "Voltorb", "Electrode", "Exeggcute", "Exeggutor", "Cubone",
    "Marowak", "Hitmonlee", "Hitmonchan", "Lickitung", "Koffing", "Weezing", "Rhyhorn", "Rhydon",
    "Chansey", "Tangela", "Kangaskhan", "Horsea", "Seadra", "Goldeen", "Seaking", "Staryu",
    "Starmie", "Mr. Mime", "Scyther", "Jynx", "Electabuzz", "Magmar", "Pinsir", "Tauros",
    "Magikarp", "Gyarados", "Lapras", "Ditto", "Eevee", "Vaporeon", "Jolteon", "Flareon", "Porygon",
    "Omanyte", "Omastar", "Kabuto", "Kabutops", "Aerodactyl", "Snorlax", "Articuno", "Zapdos",
    "Moltres", "Dratini", "Dragonair", "Dragonite", "Mewtwo", "Mew",
];

/// PokeAPI ids are 1-based; catalog indices are 0-based. Defined on `0..CATALOG_SIZE`.
pub fn to_api_id(index: usize) -> u16 {
    debug_assert!(is_valid_index(index), "catalog index {index} out of range");
    u16::try_from(index.saturating_add(1)).unwrap_or(u16::MAX)
}

pub fn to_display_code(index: usize) -> String {
    format!("{:03}", to_api_id(index))
}

pub fn catalog_name(index: usize) -> Option<&'static str> {
    FIRST_151.get(index).copied()
}

pub fn is_valid_index(index: usize) -> bool {
    index < CATALOG_SIZE
}

/// Indices whose display code or name contains `query` (case-insensitive on the name).
pub fn filter_catalog(query: &str) -> Vec<usize> {
    let query = query.trim().to_lowercase();
    FIRST_151
        .iter()
        .enumerate()
        .filter(|(index, name)| {
            query.is_empty()
                || to_display_code(*index).contains(&query)
                || name.to_lowercase().contains(&query)
        })
        .map(|(index, _)| index)
        .collect()
}
