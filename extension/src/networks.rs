// Networks the popup knows about

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Network {
    pub name: &'static str,
    pub logo: &'static str,
    pub supported: bool,
}

pub const NETWORKS: &[Network] = &[
    Network {
        name: "Alexander",
        logo: "assets/chain-logo/polkadot.png",
        supported: true,
    },
    Network {
        name: "Kusama",
        logo: "assets/chain-logo/kusama.png",
        supported: true,
    },
    Network {
        name: "Edgeware",
        logo: "assets/chain-logo/edgeware.png",
        supported: false,
    },
];

/// Case-insensitive lookup; directive text is usually lower case.
pub fn find(name: &str) -> Option<&'static Network> {
    NETWORKS.iter().find(|n| n.name.eq_ignore_ascii_case(name))
}
