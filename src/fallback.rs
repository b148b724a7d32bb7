//! Scripted fallback replies: keyword-based topic classification plus a
//! per-character canned response table.

use crate::agent::AgentProfile;
use crate::responder::{RespondError, Responder};

/// Topic buckets a question can be classified into. `Default` catches
/// everything without a keyword match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Topic {
    Metaverse,
    Ai,
    Avatar,
    Web3,
    Economy,
    Roles,
    Social,
    Default,
}

/// Classify a question by case-insensitive substring matching against an
/// ordered list of keyword groups; the first matching group wins, so the same
/// question always maps to the same bucket.
pub fn classify(question: &str) -> Topic {
    let q = question.to_lowercase();
    let matches_any = |keywords: &[&str]| keywords.iter().any(|k| q.contains(k));

    if matches_any(&["metaverse", "project", "goal"]) {
        Topic::Metaverse
    } else if matches_any(&["ai", "chatbot"]) {
        Topic::Ai
    } else if matches_any(&["avatar", "nft"]) {
        Topic::Avatar
    } else if matches_any(&["web3", "login", "metamask"]) {
        Topic::Web3
    } else if matches_any(&["economy", "shop", "gift"]) {
        Topic::Economy
    } else if matches_any(&["role", "permission"]) {
        Topic::Roles
    } else if matches_any(&["voice", "video", "social"]) {
        Topic::Social
    } else {
        Topic::Default
    }
}

/// Canned reply for a character and topic. Characters without a dedicated
/// table use the Guide Bot persona; topics without a dedicated entry use that
/// persona's default.
pub fn scripted_reply(character: &str, topic: Topic) -> &'static str {
    match character {
        "Finn the Human" => finn(topic),
        "Gary Xia" => gary(topic),
        "Jake the Dog" => jake(topic),
        _ => guide(topic),
    }
}

fn finn(topic: Topic) -> &'static str {
    match topic {
        Topic::Metaverse => {
            "The Web3 Metaverse is our vision for the future! It's an immersive world where you can socialize, work, and play. We're seamlessly blending AI, blockchain, and social interaction to create a truly next-generation digital experience. It's not just a platform; it's a new reality."
        }
        Topic::Ai => {
            "Our AI-powered avatars are game-changers. They're not just characters; they're intelligent beings you can talk to. They can be your personal guide, a friendly face in a virtual store, or even a digital twin that represents you. The possibilities are endless!"
        }
        Topic::Avatar => {
            "Absolutely! Your identity is key. We want you to create a 3D avatar that's uniquely you. And by minting it as an NFT, you truly own your digital identity. It's about giving power and ownership back to the user, which is a core principle for us."
        }
        Topic::Web3 => {
            "Security and user control are paramount. Using MetaMask for login means you get a secure, decentralized entry point into the metaverse. No more forgotten passwords! It's the Web3 way: your keys, your identity, your world. It's simple, safe, and powerful."
        }
        Topic::Economy => {
            "We're building a real, functioning digital economy. Powered by the blockchain, you'll be able to shop for virtual goods, send gifts to friends, and even offer services. It creates a dynamic and engaging world where your digital assets have real value and utility."
        }
        _ => {
            "That's a great question! At MyopicMetaverse, our goal is to push the boundaries of what's possible. The Web3 Metaverse is the culmination of that effort, bringing together the best of AI, Web3, and social platforms into one cohesive vision for the future."
        }
    }
}

fn gary(topic: Topic) -> &'static str {
    match topic {
        Topic::Metaverse => {
            "From a technical view, the Web3 Metaverse is a decentralized application (dApp) that bridges a 3D frontend with multiple smart contracts on the backend. We're ensuring every interaction is secure, transparent, and recorded on-chain where it matters."
        }
        Topic::Ai => {
            "The AI avatars run on our proprietary chatbot tech, but their knowledge can be permissioned. Think of it like a smart contract defining what data the AI can access. This allows for secure, context-aware conversations that respect user privacy and roles."
        }
        Topic::Avatar => {
            "Yes, your avatar can be an ERC-721 token. We're building a minting contract that will allow you to customize its traits, which are stored in the NFT's metadata. This ensures your unique avatar is verifiably yours on the blockchain. The gas fees for minting will be optimized, of course."
        }
        Topic::Web3 => {
            "The login flow uses a sign-in with Ethereum (SIWE) message. Your MetaMask wallet signs a message to prove ownership of your address, which we use to authenticate you. It's far more secure than traditional passwords and is the standard for Web3."
        }
        Topic::Economy => {
            "The economy runs on smart contracts. When you send a gift, you're essentially executing a transaction with an ERC-20 or ERC-721 token. This makes all transfers peer-to-peer and censorship-resistant. Every transaction is verifiable on-chain."
        }
        _ => {
            "Let's break that down. The core of it is a set of smart contracts governing identity, assets, and interactions. Everything is designed to be as trustless and decentralized as possible, giving users true ownership of their digital footprint in the metaverse."
        }
    }
}

fn jake(topic: Topic) -> &'static str {
    match topic {
        Topic::Metaverse => {
            "Think of the Web3 Metaverse as the ultimate social space! It's a place to connect with people in a more meaningful way than just a simple chat window. You can explore amazing environments, meet new friends, and have shared experiences together in real-time."
        }
        Topic::Ai => {
            "The AI avatars make the world feel alive! Imagine walking into a virtual shop and being greeted by a helpful AI assistant, or having an AI guide show you and your friends around a new area. They make the experience more interactive and fun for everyone."
        }
        Topic::Avatar => {
            "Your avatar is your social identity! Making it an NFT is so cool because it becomes a unique digital collectible that represents you. You can show it off to your friends, and it's completely yours. It's a great way to express yourself in the virtual world."
        }
        Topic::Social => {
            "That's the best part! With spatial voice and video chat, you can just walk up to someone and start talking, just like in real life. It makes conversations feel so natural and spontaneous. It's perfect for hosting events, meetups, or just hanging out."
        }
        Topic::Economy => {
            "The virtual economy is all about social interaction! You can send a cool digital gift to a friend for their birthday or tip a creator for their awesome virtual gallery. It adds a whole new layer to how we can interact and show appreciation for each other online."
        }
        _ => {
            "That's a great point! Ultimately, every feature we're building is about bringing people together. Whether it's through creating unique avatars, exploring together, or sharing gifts, our goal is to build a vibrant and connected community."
        }
    }
}

fn guide(topic: Topic) -> &'static str {
    match topic {
        Topic::Metaverse => {
            "The Web3 Metaverse is a web-based virtual world integrating AI chatbots, customizable 3D avatars, social chat features, and a blockchain-based economy."
        }
        Topic::Ai => {
            "AI-powered avatars are intelligent agents capable of natural language conversation. They can serve as guides, assistants, or customer service representatives within the virtual environment."
        }
        Topic::Avatar => {
            "Users can create a unique 3D avatar. This avatar can be minted as a non-fungible token (NFT) to establish verifiable digital ownership."
        }
        Topic::Web3 => {
            "Access is granted via a secure, wallet-based login using MetaMask. This method leverages Web3 technology for decentralized authentication without passwords."
        }
        Topic::Economy => {
            "The platform includes a virtual economy. Users can engage in blockchain-based transactions to shop, send money, or give digital gifts."
        }
        Topic::Roles => {
            "The system uses knowledge-based roles and permissions. This allows for granular control over what information and capabilities each user or AI avatar can access."
        }
        Topic::Social => {
            "The platform supports real-time voice and video chat with spatial audio, allowing for natural conversations as users move through the virtual environment."
        }
        Topic::Default => {
            "I can provide information on these core features: AI Avatars, Custom 3D Avatars, Web3 Login, Virtual Economy, and Role-Based Permissions. Please specify your topic of interest."
        }
    }
}

/// Backend that only ever answers from the canned tables. Infallible, which
/// is what makes it a safe last resort for the fallback decorator.
pub struct ScriptedResponder;

impl Responder for ScriptedResponder {
    fn respond(&self, profile: &AgentProfile, question: &str) -> Result<String, RespondError> {
        Ok(scripted_reply(&profile.name, classify(question)).to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification_uses_first_matching_group() {
        // "ai" would also match, but the metaverse group is checked first.
        assert_eq!(classify("Is the metaverse full of AI?"), Topic::Metaverse);
        assert_eq!(classify("How do the AI chatbots work?"), Topic::Ai);
        assert_eq!(classify("Can I mint an NFT?"), Topic::Avatar);
        assert_eq!(classify("tell me about METAMASK"), Topic::Web3);
        assert_eq!(classify("where do I shop?"), Topic::Economy);
        assert_eq!(classify("what permissions exist?"), Topic::Roles);
        assert_eq!(classify("is there voice chat?"), Topic::Social);
        assert_eq!(classify("banana"), Topic::Default);
    }

    #[test]
    fn classification_is_deterministic() {
        let question = "Tell me about the virtual economy";
        let first = classify(question);
        for _ in 0..10 {
            assert_eq!(classify(question), first);
        }
    }

    #[test]
    fn unknown_character_uses_guide_table() {
        assert_eq!(
            scripted_reply("Somebody Else", Topic::Metaverse),
            scripted_reply("Guide Bot", Topic::Metaverse)
        );
    }

    #[test]
    fn missing_topic_falls_back_to_persona_default() {
        // Finn has no dedicated roles entry; his own default applies.
        assert_eq!(
            scripted_reply("Finn the Human", Topic::Roles),
            scripted_reply("Finn the Human", Topic::Default)
        );
    }
}
