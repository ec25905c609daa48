//! The `OXM_OF_*` field namespace (`oxm_class == OpenFlowBasic`).

enum_with_unknown! {
    /// One of the `OFPXMT_OFB_*` basic match fields.
    pub enum OxmField(u8) {
        InPort = 0,
        InPhyPort = 1,
        Metadata = 2,
        EthDst = 3,
        EthSrc = 4,
        EthType = 5,
        VlanVid = 6,
        VlanPcp = 7,
        IpDscp = 8,
        IpEcn = 9,
        IpProto = 10,
        Ipv4Src = 11,
        Ipv4Dst = 12,
        TcpSrc = 13,
        TcpDst = 14,
        UdpSrc = 15,
        UdpDst = 16,
        SctpSrc = 17,
        SctpDst = 18,
        Icmpv4Type = 19,
        Icmpv4Code = 20,
        ArpOp = 21,
        ArpSpa = 22,
        ArpTpa = 23,
        ArpSha = 24,
        ArpTha = 25,
        Ipv6Src = 26,
        Ipv6Dst = 27,
        Ipv6Flabel = 28,
        Icmpv6Type = 29,
        Icmpv6Code = 30,
        Ipv6NdTarget = 31,
        Ipv6NdSll = 32,
        Ipv6NdTll = 33,
        MplsLabel = 34,
        MplsTc = 35,
        MplsBos = 36,
        PbbIsid = 37,
        TunnelId = 38,
        Ipv6ExtHdr = 39,
    }
}
