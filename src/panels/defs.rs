const BUILTIN_ANTIGENS: &[&str] = &[
    "D", "C", "E", "c", "e", "Cw", "K", "k", "Kpa", "Kpb", "Jsa", "Jsb", "Fya", "Fyb", "Jka",
    "Jkb", "Lea", "Leb", "P1", "M", "N", "S", "s", "Lua", "Lub",
];

const BUILTIN_PAIRS: &[(&str, &str)] = &[
    ("C", "c"),
    ("E", "e"),
    ("K", "k"),
    ("Kpa", "Kpb"),
    ("Jsa", "Jsb"),
    ("Fya", "Fyb"),
    ("Jka", "Jkb"),
    ("Lea", "Leb"),
    ("M", "N"),
    ("S", "s"),
    ("Lua", "Lub"),
];

// Antigens whose heterozygous expression still counts as exclusion evidence.
const BUILTIN_ALLOWED_HETEROZYGOUS: &[&str] = &["Cw", "K", "Kpa", "Lua"];

pub fn builtin_antigens() -> &'static [&'static str] {
    BUILTIN_ANTIGENS
}

pub fn builtin_pairs() -> &'static [(&'static str, &'static str)] {
    BUILTIN_PAIRS
}

pub fn builtin_allowed_heterozygous() -> &'static [&'static str] {
    BUILTIN_ALLOWED_HETEROZYGOUS
}
