#![allow(dead_code)]

use std::collections::BTreeSet;

use bitcoin::absolute::LockTime;
use bitcoin::block::{Header, Version as BlockVersion};
use bitcoin::hashes::{sha256, Hash};
use bitcoin::secp256k1::{PublicKey, Secp256k1, SecretKey};
use bitcoin::transaction::Version;
use bitcoin::{
    Amount, Block, BlockHash, CompactTarget, OutPoint, ScriptBuf, Sequence, TapNodeHash,
    Transaction, TxIn, TxOut, Txid, Witness,
};
use taro_proof::core::assemble::BaseProofParams;
use taro_proof::core::key::taproot_script_pubkey;
use taro_proof::core::merkle::MerkleTree;
use taro_proof::core::mint::MintParams;
use taro_proof::derive_output_key;
use taro_proof::types::commitment::{tap_branch, CommitmentRoot};
use taro_proof::types::key::SerializedKey;
use taro_proof::types::proof::TaprootProof;

static INIT_LOGGER: std::sync::Once = std::sync::Once::new();

pub fn init_logger() {
    INIT_LOGGER.call_once(|| {
        env_logger::builder()
            .is_test(true)
            .filter_level(log::LevelFilter::Debug)
            .try_init()
            .ok();
    });
}

/// Public key for the secret `[n; 32]`.
pub fn pubkey(n: u8) -> SerializedKey {
    let secp = Secp256k1::new();
    let secret = SecretKey::from_slice(&[n; 32]).expect("valid secret");
    SerializedKey::from(PublicKey::from_secret_key(&secp, &secret))
}

pub fn node(tag: &[u8]) -> TapNodeHash {
    TapNodeHash::from_byte_array(sha256::Hash::hash(tag).to_byte_array())
}

/// Kind of each output in a fixture anchor transaction.
#[derive(Debug, Clone, Copy)]
pub enum Output {
    /// The asset output.
    Asset,
    /// BIP-86 change to the key for secret `[n; 32]`.
    Bip86(u8),
    /// Output committing to an unrelated tapscript root.
    Script(u8, &'static [u8]),
    /// Second copy of the asset commitment branched with `tag`, claimed as
    /// an exclusion that reveals the asset root as the sibling.
    SwappedAsset(u8, &'static [u8]),
    /// Non-Taproot data carrier.
    OpReturn,
}

pub fn filler_tx(n: u32) -> Transaction {
    Transaction {
        version: Version::TWO,
        lock_time: LockTime::ZERO,
        input: vec![TxIn {
            previous_output: OutPoint {
                txid: Txid::from_byte_array([0xaa; 32]),
                vout: n,
            },
            script_sig: ScriptBuf::new(),
            sequence: Sequence::MAX,
            witness: Witness::new(),
        }],
        output: vec![TxOut {
            value: Amount::from_sat(50_000),
            script_pubkey: ScriptBuf::new_op_return(n.to_le_bytes()),
        }],
    }
}

pub fn block_with(txdata: Vec<Transaction>) -> Block {
    let txids: Vec<Txid> = txdata.iter().map(Transaction::compute_txid).collect();
    let merkle_root = MerkleTree::build(&txids).expect("non-empty block").root();
    Block {
        header: Header {
            version: BlockVersion::ONE,
            prev_blockhash: BlockHash::all_zeros(),
            merkle_root,
            time: 1_700_000_000,
            bits: CompactTarget::from_consensus(0x207f_ffff),
            nonce: 7,
        },
        txdata,
    }
}

/// A genesis anchor transaction mined in a block.
pub struct MintFixture {
    pub commitment: CommitmentRoot,
    pub sibling: Option<TapNodeHash>,
    pub internal_key: SerializedKey,
    pub genesis_point: OutPoint,
    pub output_index: u32,
    pub tx: Transaction,
    pub tx_index: usize,
    pub block: Block,
    pub exclusion_proofs: Vec<TaprootProof>,
}

impl MintFixture {
    /// Asset at `output_index` among `output_count` outputs, all others
    /// BIP-86, mined after `filler` unrelated transactions.
    pub fn new(output_index: u32, output_count: u32, filler: u32) -> Self {
        let outputs: Vec<Output> = (0..output_count)
            .map(|idx| {
                if idx == output_index {
                    Output::Asset
                } else {
                    Output::Bip86(20 + idx as u8)
                }
            })
            .collect();
        Self::with_outputs(&outputs, filler)
    }

    pub fn with_outputs(outputs: &[Output], filler: u32) -> Self {
        let commitment = CommitmentRoot(node(b"taro asset tree"));
        let sibling = Some(node(b"tapscript sibling"));
        let internal_key = pubkey(1);
        let genesis_point = OutPoint {
            txid: Txid::from_byte_array([0x42; 32]),
            vout: 3,
        };

        let mut output_index = 0;
        let mut scripts = Vec::new();
        let mut exclusion_proofs = Vec::new();
        for (idx, output) in outputs.iter().enumerate() {
            let idx = idx as u32;
            let script = match *output {
                Output::Asset => {
                    output_index = idx;
                    let root = tap_branch(commitment.0, sibling.as_ref());
                    taproot_script_pubkey(derive_output_key(&internal_key, Some(root)).unwrap())
                }
                Output::Bip86(n) => {
                    let key = pubkey(n);
                    exclusion_proofs.push(TaprootProof::bip86(idx, key));
                    taproot_script_pubkey(derive_output_key(&key, None).unwrap())
                }
                Output::Script(n, tag) => {
                    let key = pubkey(n);
                    exclusion_proofs.push(TaprootProof::commitment(idx, key, node(tag), None));
                    taproot_script_pubkey(derive_output_key(&key, Some(node(tag))).unwrap())
                }
                Output::SwappedAsset(n, tag) => {
                    let key = pubkey(n);
                    exclusion_proofs.push(TaprootProof::commitment(
                        idx,
                        key,
                        node(tag),
                        Some(commitment.0),
                    ));
                    let root = tap_branch(commitment.0, Some(&node(tag)));
                    taproot_script_pubkey(derive_output_key(&key, Some(root)).unwrap())
                }
                Output::OpReturn => {
                    exclusion_proofs.push(TaprootProof::bip86(idx, pubkey(99)));
                    ScriptBuf::new_op_return([0x54, 0x41, 0x52, 0x4f])
                }
            };
            scripts.push(script);
        }

        let tx = Transaction {
            version: Version::TWO,
            lock_time: LockTime::ZERO,
            input: vec![TxIn {
                previous_output: genesis_point,
                script_sig: ScriptBuf::new(),
                sequence: Sequence::MAX,
                witness: Witness::new(),
            }],
            output: scripts
                .into_iter()
                .map(|script_pubkey| TxOut {
                    value: Amount::from_sat(1_000),
                    script_pubkey,
                })
                .collect(),
        };

        let mut txdata: Vec<Transaction> = (0..filler).map(filler_tx).collect();
        txdata.push(tx.clone());
        let block = block_with(txdata);

        Self {
            commitment,
            sibling,
            internal_key,
            genesis_point,
            output_index,
            tx,
            tx_index: filler as usize,
            block,
            exclusion_proofs,
        }
    }

    pub fn base_params(&self) -> BaseProofParams<'_, CommitmentRoot> {
        BaseProofParams {
            block: &self.block,
            tx: &self.tx,
            tx_index: self.tx_index,
            output_index: self.output_index,
            internal_key: self.internal_key,
            taro_root: &self.commitment,
            tapscript_sibling: self.sibling,
            exclusion_proofs: self.exclusion_proofs.clone(),
        }
    }

    pub fn mint_params(&self) -> MintParams<'_, CommitmentRoot> {
        MintParams {
            base: self.base_params(),
            genesis_point: self.genesis_point,
        }
    }

    pub fn known_headers(&self) -> BTreeSet<BlockHash> {
        [self.block.block_hash()].into_iter().collect()
    }
}
