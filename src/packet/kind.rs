//! The five packet variants of the geo-routing protocol.

/// Which protocol message a packet (and its header and payload) is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PacketKind {
    /// Data packet routed greedily to a destination.
    Gr,
    /// One-hop neighbor discovery.
    Hi,
    /// Location publish toward the advertiser's rendezvous.
    Rep,
    /// Location lookup toward the subject's rendezvous.
    Ret,
    /// Location reply back toward the requester.
    Res,
}

impl PacketKind {
    pub const ALL: [PacketKind; 5] = [
        PacketKind::Gr,
        PacketKind::Hi,
        PacketKind::Rep,
        PacketKind::Ret,
        PacketKind::Res,
    ];

    /// The registry name of this kind.
    pub fn name(self) -> &'static str {
        match self {
            PacketKind::Gr => "gr",
            PacketKind::Hi => "hi",
            PacketKind::Rep => "rep",
            PacketKind::Ret => "ret",
            PacketKind::Res => "res",
        }
    }

    /// Inverse of [`name`](Self::name).
    pub fn from_name(name: &str) -> Option<PacketKind> {
        PacketKind::ALL.into_iter().find(|k| k.name() == name)
    }
}

impl std::fmt::Display for PacketKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            PacketKind::Gr => "GR",
            PacketKind::Hi => "HI",
            PacketKind::Rep => "Rep",
            PacketKind::Ret => "Ret",
            PacketKind::Res => "Res",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_round_trip() {
        for kind in PacketKind::ALL {
            assert_eq!(PacketKind::from_name(kind.name()), Some(kind));
        }
        assert_eq!(PacketKind::from_name("flood"), None);
    }
}
