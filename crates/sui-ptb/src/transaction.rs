//! Programmable Transaction Structures
//!
//! An ordered, append-only batch of commands executed atomically by the
//! ledger. Mirrors the JSON shape fullnodes accept for unresolved
//! programmable transactions; BCS encoding and signing happen downstream.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use navi_core::constants::FRAMEWORK_PACKAGE;
use navi_core::{Address, CoinType, ObjectId, TxError};

use crate::handle::{Balance, Coin, HandleId};

/// Protocol limit on commands per programmable transaction
pub const MAX_COMMANDS: usize = 1024;

/// Reference to a value inside the batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Argument {
    /// The gas coin of the transaction
    GasCoin,
    /// One of the transaction inputs
    Input(u16),
    /// The (single) result of a command
    Result(u16),
    /// One element of a multi-value command result
    NestedResult(u16, u16),
}

/// Pure (non-object) input value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "camelCase")]
pub enum PureValue {
    Bool(bool),
    U8(u8),
    U64(#[serde(with = "u64_string")] u64),
    U128(String),
    Address(Address),
    String(String),
    AddressVec(Vec<Address>),
    StringVec(Vec<String>),
}

mod u64_string {
    use serde::{Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &u64, serializer: S) -> Result<S::Ok, S::Error> {
        navi_core::serde_helpers::u64_as_string(value, serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
        navi_core::serde_helpers::u64_from_str_or_num(deserializer)
    }
}

/// Transaction input
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CallArg {
    Pure(PureValue),
    /// Object input; ownership and version are resolved by the ledger client
    Object {
        object_id: ObjectId,
        mutable: bool,
    },
}

/// A Move function call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveCall {
    pub package: ObjectId,
    pub module: String,
    pub function: String,
    pub type_arguments: Vec<String>,
    pub arguments: Vec<Argument>,
}

impl MoveCall {
    pub fn new(package: &ObjectId, module: &str, function: &str) -> Self {
        Self {
            package: package.clone(),
            module: module.to_string(),
            function: function.to_string(),
            type_arguments: vec![],
            arguments: vec![],
        }
    }

    pub fn type_args<I, T>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        self.type_arguments = types
            .into_iter()
            .map(|t| CoinType::new(t.as_ref()).into())
            .collect();
        self
    }

    pub fn args(mut self, arguments: impl IntoIterator<Item = Argument>) -> Self {
        self.arguments = arguments.into_iter().collect();
        self
    }

    /// `package::module::function`
    pub fn target(&self) -> String {
        format!("{}::{}::{}", self.package, self.module, self.function)
    }
}

/// Batch command
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    MoveCall(MoveCall),
    SplitCoins {
        coin: Argument,
        amounts: Vec<Argument>,
    },
    MergeCoins {
        destination: Argument,
        sources: Vec<Argument>,
    },
    TransferObjects {
        objects: Vec<Argument>,
        recipient: Argument,
    },
    /// Build a `vector<T>` from values; the type is inferred for objects
    MakeMoveVec {
        type_argument: Option<String>,
        elements: Vec<Argument>,
    },
}

impl Command {
    pub fn as_move_call(&self) -> Option<&MoveCall> {
        match self {
            Command::MoveCall(call) => Some(call),
            _ => None,
        }
    }
}

/// Finished batch, ready for the ledger client
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgrammableTransaction {
    pub inputs: Vec<CallArg>,
    pub commands: Vec<Command>,
}

impl ProgrammableTransaction {
    /// Serialize to JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Serialize to pretty JSON string
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// All move calls whose `module::function` matches
    pub fn find_calls<'a>(
        &'a self,
        module: &'a str,
        function: &'a str,
    ) -> impl Iterator<Item = &'a MoveCall> + 'a {
        self.commands
            .iter()
            .filter_map(Command::as_move_call)
            .filter(move |c| c.module == module && c.function == function)
    }
}

/// Multi-value result of a move call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallResult(u16);

impl CallResult {
    /// The whole result (single-return functions)
    pub fn single(self) -> Argument {
        Argument::Result(self.0)
    }

    /// Element `index` of a tuple return
    pub fn nested(self, index: u16) -> Argument {
        Argument::NestedResult(self.0, index)
    }
}

/// Builder for a [`ProgrammableTransaction`].
///
/// Value handles ([`Coin`], [`Balance`]) created through the builder are
/// tracked until they are consumed; [`TransactionBlock::finish`] refuses to
/// produce a batch while any handle is still live.
#[derive(Debug, Default)]
pub struct TransactionBlock {
    inputs: Vec<CallArg>,
    object_inputs: HashMap<ObjectId, u16>,
    commands: Vec<Command>,
    live: BTreeMap<u32, String>,
    next_handle: u32,
}

impl TransactionBlock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inputs(&self) -> &[CallArg] {
        &self.inputs
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    /// Number of value handles not yet consumed
    pub fn live_handles(&self) -> usize {
        self.live.len()
    }

    // -------------------------------------------------------------------------
    // Inputs
    // -------------------------------------------------------------------------

    pub fn gas(&self) -> Argument {
        Argument::GasCoin
    }

    pub fn pure(&mut self, value: PureValue) -> Argument {
        self.inputs.push(CallArg::Pure(value));
        Argument::Input((self.inputs.len() - 1) as u16)
    }

    pub fn pure_u64(&mut self, value: u64) -> Argument {
        self.pure(PureValue::U64(value))
    }

    pub fn pure_u128(&mut self, value: u128) -> Argument {
        self.pure(PureValue::U128(value.to_string()))
    }

    pub fn pure_u8(&mut self, value: u8) -> Argument {
        self.pure(PureValue::U8(value))
    }

    pub fn pure_bool(&mut self, value: bool) -> Argument {
        self.pure(PureValue::Bool(value))
    }

    pub fn pure_address(&mut self, address: &Address) -> Argument {
        self.pure(PureValue::Address(address.clone()))
    }

    /// Mutable object input. Repeated ids share one input slot.
    pub fn object(&mut self, object_id: &ObjectId) -> Argument {
        self.object_input(object_id, true)
    }

    /// Read-only object input (clock, configs, metadata)
    pub fn immutable_object(&mut self, object_id: &ObjectId) -> Argument {
        self.object_input(object_id, false)
    }

    fn object_input(&mut self, object_id: &ObjectId, mutable: bool) -> Argument {
        if let Some(&index) = self.object_inputs.get(object_id) {
            if mutable {
                if let CallArg::Object { mutable: m, .. } = &mut self.inputs[index as usize] {
                    *m = true;
                }
            }
            return Argument::Input(index);
        }
        self.inputs.push(CallArg::Object {
            object_id: object_id.clone(),
            mutable,
        });
        let index = (self.inputs.len() - 1) as u16;
        self.object_inputs.insert(object_id.clone(), index);
        Argument::Input(index)
    }

    // -------------------------------------------------------------------------
    // Commands
    // -------------------------------------------------------------------------

    fn push(&mut self, command: Command) -> u16 {
        self.commands.push(command);
        (self.commands.len() - 1) as u16
    }

    pub fn move_call(&mut self, call: MoveCall) -> CallResult {
        CallResult(self.push(Command::MoveCall(call)))
    }

    /// Take ownership of a coin produced by a command
    pub fn adopt_coin(&mut self, argument: Argument, coin_type: &CoinType) -> Coin {
        let id = self.track(format!("Coin<{}>", coin_type.short_name()));
        Coin::new(id, argument, coin_type.clone())
    }

    /// Take ownership of a balance produced by a command
    pub fn adopt_balance(&mut self, argument: Argument, coin_type: &CoinType) -> Balance {
        let id = self.track(format!("Balance<{}>", coin_type.short_name()));
        Balance::new(id, argument, coin_type.clone())
    }

    /// Mark a coin as consumed and hand back its argument
    pub fn consume_coin(&mut self, coin: Coin) -> Argument {
        let (id, argument, _) = coin.into_parts();
        self.release(id);
        argument
    }

    /// Mark a balance as consumed and hand back its argument
    pub fn consume_balance(&mut self, balance: Balance) -> Argument {
        let (id, argument, _) = balance.into_parts();
        self.release(id);
        argument
    }

    fn track(&mut self, label: String) -> HandleId {
        let id = self.next_handle;
        self.next_handle += 1;
        self.live.insert(id, label);
        HandleId(id)
    }

    fn release(&mut self, id: HandleId) {
        self.live.remove(&id.0);
    }

    /// Split `amount` off `source` into a new coin
    pub fn split_coin(&mut self, source: Argument, amount: u64, coin_type: &CoinType) -> Coin {
        let amount = self.pure_u64(amount);
        let index = self.push(Command::SplitCoins {
            coin: source,
            amounts: vec![amount],
        });
        self.adopt_coin(Argument::NestedResult(index, 0), coin_type)
    }

    /// Split several amounts off `source` in one command
    pub fn split_coins(
        &mut self,
        source: Argument,
        amounts: &[u64],
        coin_type: &CoinType,
    ) -> Vec<Coin> {
        let amount_args: Vec<Argument> = amounts.iter().map(|a| self.pure_u64(*a)).collect();
        let index = self.push(Command::SplitCoins {
            coin: source,
            amounts: amount_args,
        });
        (0..amounts.len() as u16)
            .map(|i| self.adopt_coin(Argument::NestedResult(index, i), coin_type))
            .collect()
    }

    /// Merge coin handles into `destination`
    pub fn merge_coins(&mut self, destination: Argument, sources: Vec<Coin>) {
        if sources.is_empty() {
            return;
        }
        let sources = sources.into_iter().map(|c| self.consume_coin(c)).collect();
        self.push(Command::MergeCoins {
            destination,
            sources,
        });
    }

    /// Merge owned coin object inputs into `destination`
    pub fn merge_object_coins(&mut self, destination: Argument, sources: Vec<Argument>) {
        if sources.is_empty() {
            return;
        }
        self.push(Command::MergeCoins {
            destination,
            sources,
        });
    }

    /// Send coins to `recipient`
    pub fn transfer_coins(&mut self, coins: Vec<Coin>, recipient: &Address) {
        if coins.is_empty() {
            return;
        }
        let objects = coins.into_iter().map(|c| self.consume_coin(c)).collect();
        let recipient = self.pure_address(recipient);
        self.push(Command::TransferObjects { objects, recipient });
    }

    /// Send arbitrary result objects (receipts, positions) to `recipient`
    pub fn transfer_objects(&mut self, objects: Vec<Argument>, recipient: &Address) {
        if objects.is_empty() {
            return;
        }
        let recipient = self.pure_address(recipient);
        self.push(Command::TransferObjects { objects, recipient });
    }

    /// Wrap coins into a `vector<Coin<T>>` argument
    pub fn make_coin_vec(&mut self, coins: Vec<Coin>) -> Argument {
        let elements = coins.into_iter().map(|c| self.consume_coin(c)).collect();
        let index = self.push(Command::MakeMoveVec {
            type_argument: None,
            elements,
        });
        Argument::Result(index)
    }

    // -------------------------------------------------------------------------
    // Framework helpers (0x2::coin / 0x2::balance)
    // -------------------------------------------------------------------------

    fn framework_call(
        &mut self,
        module: &str,
        function: &str,
        coin_type: &CoinType,
        arguments: Vec<Argument>,
    ) -> CallResult {
        let call = MoveCall::new(&ObjectId::new(FRAMEWORK_PACKAGE), module, function)
            .type_args([coin_type.as_str()])
            .args(arguments);
        self.move_call(call)
    }

    /// `coin::value` read of a live coin (does not consume it)
    pub fn coin_value(&mut self, coin: &Coin) -> Argument {
        let arg = coin.argument();
        let coin_type = coin.coin_type().clone();
        self.framework_call("coin", "value", &coin_type, vec![arg])
            .single()
    }

    pub fn zero_coin(&mut self, coin_type: &CoinType) -> Coin {
        let result = self.framework_call("coin", "zero", coin_type, vec![]);
        self.adopt_coin(result.single(), coin_type)
    }

    pub fn zero_balance(&mut self, coin_type: &CoinType) -> Balance {
        let result = self.framework_call("balance", "zero", coin_type, vec![]);
        self.adopt_balance(result.single(), coin_type)
    }

    pub fn coin_into_balance(&mut self, coin: Coin) -> Balance {
        let coin_type = coin.coin_type().clone();
        let arg = self.consume_coin(coin);
        let result = self.framework_call("coin", "into_balance", &coin_type, vec![arg]);
        self.adopt_balance(result.single(), &coin_type)
    }

    pub fn balance_into_coin(&mut self, balance: Balance) -> Coin {
        let coin_type = balance.coin_type().clone();
        let arg = self.consume_balance(balance);
        let result = self.framework_call("coin", "from_balance", &coin_type, vec![arg]);
        self.adopt_coin(result.single(), &coin_type)
    }

    /// Destroy a balance the ledger will verify is zero
    pub fn destroy_zero_balance(&mut self, balance: Balance) {
        let coin_type = balance.coin_type().clone();
        let arg = self.consume_balance(balance);
        self.framework_call("balance", "destroy_zero", &coin_type, vec![arg]);
    }

    /// Destroy a coin the ledger will verify is zero
    pub fn destroy_zero_coin(&mut self, coin: Coin) {
        let coin_type = coin.coin_type().clone();
        let arg = self.consume_coin(coin);
        self.framework_call("coin", "destroy_zero", &coin_type, vec![arg]);
    }

    // -------------------------------------------------------------------------
    // Finalization
    // -------------------------------------------------------------------------

    /// Finish the batch. Fails while handles are live or the command limit
    /// is exceeded.
    pub fn finish(self) -> Result<ProgrammableTransaction, TxError> {
        if !self.live.is_empty() {
            let handles = self
                .live
                .iter()
                .map(|(id, label)| format!("#{} {}", id, label))
                .collect::<Vec<_>>()
                .join(", ");
            return Err(TxError::UnconsumedHandles {
                count: self.live.len(),
                handles,
            });
        }
        if self.commands.len() > MAX_COMMANDS {
            return Err(TxError::TooManyCommands {
                limit: MAX_COMMANDS,
            });
        }
        Ok(ProgrammableTransaction {
            inputs: self.inputs,
            commands: self.commands,
        })
    }
}
